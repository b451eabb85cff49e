//! In-memory mailbox implementation
//!
//! Serves scripted result pages and records every call, so the search and
//! deletion flows can be verified without network access.

use std::collections::HashSet;
use std::sync::RwLock;

use super::{ListRequest, MailboxApi};
use crate::error::Error;
use crate::gmail::api::{ListMessagesResponse, MessageRef};

/// In-memory implementation of MailboxApi
///
/// Pages are returned in order; page `n` (zero-based) is requested with the
/// cursor `page-n`. Failures can be injected on a page or on a message id.
pub struct InMemoryMailbox {
    pages: Vec<Vec<MessageRef>>,
    failing_page: Option<usize>,
    failing_ids: HashSet<String>,
    list_calls: RwLock<Vec<Option<String>>>,
    deleted: RwLock<Vec<String>>,
    trashed: RwLock<Vec<String>>,
}

impl InMemoryMailbox {
    /// Create a mailbox whose search returns nothing
    pub fn new() -> Self {
        Self::with_pages(Vec::new())
    }

    /// Create a mailbox whose search returns the given pages
    pub fn with_pages(pages: Vec<Vec<MessageRef>>) -> Self {
        Self {
            pages,
            failing_page: None,
            failing_ids: HashSet::new(),
            list_calls: RwLock::new(Vec::new()),
            deleted: RwLock::new(Vec::new()),
            trashed: RwLock::new(Vec::new()),
        }
    }

    /// Make the list request for page `index` fail
    pub fn fail_page(mut self, index: usize) -> Self {
        self.failing_page = Some(index);
        self
    }

    /// Make delete and trash calls for `id` fail
    pub fn fail_message(mut self, id: impl Into<String>) -> Self {
        self.failing_ids.insert(id.into());
        self
    }

    /// Page cursors seen by list requests, in call order
    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.list_calls.read().unwrap().clone()
    }

    /// Ids passed to successful or failed delete calls, in call order
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.read().unwrap().clone()
    }

    /// Ids passed to trash calls, in call order
    pub fn trashed(&self) -> Vec<String> {
        self.trashed.read().unwrap().clone()
    }

    fn page_index(token: Option<&str>) -> Option<usize> {
        match token {
            None => Some(0),
            Some(token) => token.strip_prefix("page-")?.parse().ok(),
        }
    }

    fn check_message(&self, id: &str) -> crate::Result<()> {
        if self.failing_ids.contains(id) {
            return Err(Error::RemoteProtocol {
                status: Some(500),
                message: format!("Backend error for message {}", id),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl MailboxApi for InMemoryMailbox {
    fn list_messages(&self, request: ListRequest<'_>) -> crate::Result<ListMessagesResponse> {
        self.list_calls
            .write()
            .unwrap()
            .push(request.page_token.map(str::to_string));

        let index = Self::page_index(request.page_token).ok_or_else(|| Error::RemoteProtocol {
            status: Some(400),
            message: "Invalid pageToken".to_string(),
        })?;

        if self.failing_page == Some(index) {
            return Err(Error::RemoteProtocol {
                status: Some(400),
                message: "Invalid query".to_string(),
            });
        }

        let messages = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        let total: usize = self.pages.iter().map(Vec::len).sum();

        Ok(ListMessagesResponse {
            messages: (!messages.is_empty()).then_some(messages),
            next_page_token,
            result_size_estimate: Some(total as u32),
        })
    }

    fn delete_message(&self, _user_id: &str, id: &str) -> crate::Result<()> {
        self.deleted.write().unwrap().push(id.to_string());
        self.check_message(id)
    }

    fn trash_message(&self, _user_id: &str, id: &str) -> crate::Result<()> {
        self.trashed.write().unwrap().push(id.to_string());
        self.check_message(id)
    }
}
