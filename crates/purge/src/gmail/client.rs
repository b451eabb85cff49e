//! Gmail API HTTP client
//!
//! Provides the list, delete, and trash calls used by the cleanup job.
//! Uses synchronous HTTP (ureq); every call blocks until the response arrives.

use log::debug;
use ureq::Body;
use ureq::http::Response;

use super::api::{ErrorResponse, ListMessagesResponse};
use crate::credential::Credential;
use crate::error::Error;
use crate::remote::{ListRequest, MailboxApi};

/// Gmail API client bound to one credential
///
/// Constructed once per run and passed by reference to the search and
/// deletion routines.
pub struct GmailClient {
    credential: Credential,
    base_url: String,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Maximum page size accepted by messages.list
    pub const PAGE_SIZE: u32 = 500;

    /// Create a new Gmail client
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, Self::BASE_URL)
    }

    /// Create a client that talks to a different API root
    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Self {
        Self {
            credential,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.credential.access_token)
    }

    fn messages_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{}/messages",
            self.base_url,
            urlencoding::encode(user_id)
        )
    }

    fn message_url(&self, user_id: &str, id: &str) -> String {
        format!("{}/{}", self.messages_url(user_id), urlencoding::encode(id))
    }
}

impl MailboxApi for GmailClient {
    fn list_messages(&self, request: ListRequest<'_>) -> crate::Result<ListMessagesResponse> {
        let mut call = ureq::get(&self.messages_url(request.user_id))
            .config()
            .http_status_as_error(false)
            .build()
            .header("Authorization", &self.bearer())
            .query("q", request.query)
            .query("maxResults", Self::PAGE_SIZE.to_string());

        if let Some(token) = request.page_token {
            call = call.query("pageToken", token);
        }
        if request.include_spam_trash {
            call = call.query("includeSpamTrash", "true");
        }

        debug!(
            "messages.list user={} page_token={:?}",
            request.user_id, request.page_token
        );
        let response = call.call().map_err(Error::transport)?;
        let mut response = ensure_success(response, "list messages")?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| Error::RemoteProtocol {
                status: None,
                message: format!("Failed to parse list messages response: {}", e),
            })
    }

    fn delete_message(&self, user_id: &str, id: &str) -> crate::Result<()> {
        let response = ureq::delete(&self.message_url(user_id, id))
            .config()
            .http_status_as_error(false)
            .build()
            .header("Authorization", &self.bearer())
            .call()
            .map_err(Error::transport)?;

        ensure_success(response, "delete message")?;
        Ok(())
    }

    fn trash_message(&self, user_id: &str, id: &str) -> crate::Result<()> {
        let url = format!("{}/trash", self.message_url(user_id, id));
        let response = ureq::post(&url)
            .config()
            .http_status_as_error(false)
            .build()
            .header("Authorization", &self.bearer())
            .send_empty()
            .map_err(Error::transport)?;

        ensure_success(response, "trash message")?;
        Ok(())
    }
}

/// Turn a non-2xx response into `Error::RemoteProtocol`
fn ensure_success(mut response: Response<Body>, action: &str) -> crate::Result<Response<Body>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.body_mut().read_to_string().unwrap_or_default();
    Err(Error::RemoteProtocol {
        status: Some(status.as_u16()),
        message: format!("Failed to {}: {}", action, describe_error_body(&body)),
    })
}

/// Pull the human-readable message out of a Google error envelope
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{} ({})", envelope.error.message, status),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
