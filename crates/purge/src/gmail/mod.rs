//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 consent and token refresh against Google's endpoints
//! - Gmail API client for listing, deleting, and trashing messages

mod auth;
mod client;

pub use auth::{GMAIL_FULL_SCOPE, GoogleOAuth};
pub use client::GmailClient;

/// Gmail API response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing messages
    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message (just ID and thread ID)
    #[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRef {
        pub id: String,
        pub thread_id: String,
    }

    impl MessageRef {
        pub fn new(id: impl Into<String>, thread_id: impl Into<String>) -> Self {
            Self {
                id: id.into(),
                thread_id: thread_id.into(),
            }
        }
    }

    /// Error envelope returned by Google APIs on non-2xx responses
    #[derive(Debug, Deserialize)]
    pub struct ErrorResponse {
        pub error: ErrorBody,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorBody {
        pub code: Option<u16>,
        pub message: String,
        pub status: Option<String>,
    }
}
