//! Remote mailbox trait definition

use crate::Result;
use crate::gmail::api::ListMessagesResponse;

/// Account selector meaning "the authenticated account"
pub const DEFAULT_USER_ID: &str = "me";

/// Parameters for one page of a message search
#[derive(Debug, Clone, Copy)]
pub struct ListRequest<'a> {
    pub user_id: &'a str,
    pub query: &'a str,
    pub page_token: Option<&'a str>,
    pub include_spam_trash: bool,
}

/// Operations the cleanup job needs from a remote mailbox
///
/// This trait abstracts over the Gmail REST client so the search and
/// deletion logic can run against an in-memory mailbox in tests.
/// Every call is a single blocking request; implementations never retry.
pub trait MailboxApi: Send + Sync {
    /// Fetch one page of message references matching a query
    fn list_messages(&self, request: ListRequest<'_>) -> Result<ListMessagesResponse>;

    /// Permanently delete a message, bypassing trash
    fn delete_message(&self, user_id: &str, id: &str) -> Result<()>;

    /// Move a message to trash
    fn trash_message(&self, user_id: &str, id: &str) -> Result<()>;
}
