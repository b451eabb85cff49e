//! Message search across result pages

use log::{debug, error, info, warn};

use crate::error::Error;
use crate::gmail::api::MessageRef;
use crate::remote::{DEFAULT_USER_ID, ListRequest, MailboxApi};

/// Extra knobs for a search
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Also match messages in Spam and Trash
    pub include_spam_trash: bool,
}

/// Result of running a search to completion
///
/// Keeps "nothing matched" apart from "the remote service refused the
/// search", which callers may want to treat differently.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Every matching reference across all pages, in remote order (possibly empty)
    Matches(Vec<MessageRef>),
    /// A page request failed; references gathered before the failure are dropped
    Failed(Error),
}

impl SearchOutcome {
    /// The matches, treating a failed search as an empty one
    pub fn into_matches(self) -> Vec<MessageRef> {
        match self {
            Self::Matches(refs) => refs,
            Self::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Search the authenticated account's mailbox
pub fn search(mailbox: &dyn MailboxApi, query: &str) -> SearchOutcome {
    search_with(mailbox, query, DEFAULT_USER_ID, SearchOptions::default())
}

/// Search a mailbox, following `nextPageToken` until exhausted
///
/// Any failed page aborts the whole search. The failure is logged here
/// with the query, account, and page number and never raised.
pub fn search_with(
    mailbox: &dyn MailboxApi,
    query: &str,
    user_id: &str,
    options: SearchOptions,
) -> SearchOutcome {
    let mut refs: Vec<MessageRef> = Vec::new();
    let mut page_token: Option<String> = None;
    let mut page = 0usize;

    loop {
        let request = ListRequest {
            user_id,
            query,
            page_token: page_token.as_deref(),
            include_spam_trash: options.include_spam_trash,
        };

        let response = match mailbox.list_messages(request) {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Search failed for query {:?} (user {}, page {}): {}",
                    query,
                    user_id,
                    page + 1,
                    e
                );
                return SearchOutcome::Failed(e);
            }
        };

        if let Some(messages) = response.messages {
            debug!("Page {} returned {} messages", page + 1, messages.len());
            refs.extend(messages);
        }

        match response.next_page_token {
            Some(token) if page_token.as_deref() == Some(token.as_str()) => {
                warn!(
                    "Server repeated page cursor {:?} for query {:?}; stopping after page {}",
                    token,
                    query,
                    page + 1
                );
                break;
            }
            Some(token) => {
                page_token = Some(token);
                page += 1;
            }
            None => break,
        }
    }

    info!(
        "Query {:?} matched {} messages across {} page(s)",
        query,
        refs.len(),
        page + 1
    );
    SearchOutcome::Matches(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryMailbox;

    fn refs(ids: &[&str]) -> Vec<MessageRef> {
        ids.iter()
            .map(|id| MessageRef::new(*id, format!("t-{}", id)))
            .collect()
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let mailbox = InMemoryMailbox::new();
        match search(&mailbox, "from:nobody") {
            SearchOutcome::Matches(found) => assert!(found.is_empty()),
            SearchOutcome::Failed(e) => panic!("unexpected failure: {}", e),
        }
        assert_eq!(mailbox.list_calls(), vec![None]);
    }

    #[test]
    fn test_follows_cursor_and_preserves_order() {
        let mailbox = InMemoryMailbox::with_pages(vec![refs(&["a", "b"]), refs(&["c"])]);

        let found = search(&mailbox, "older_than:1d").into_matches();

        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(found[2].thread_id, "t-c");
        assert_eq!(mailbox.list_calls(), vec![None, Some("page-1".to_string())]);
    }

    #[test]
    fn test_first_page_failure_yields_failed() {
        let mailbox = InMemoryMailbox::with_pages(vec![refs(&["a"])]).fail_page(0);

        let outcome = search(&mailbox, "bad:::query");

        assert!(outcome.is_failed());
        assert!(outcome.into_matches().is_empty());
    }

    #[test]
    fn test_later_page_failure_discards_accumulated() {
        let mailbox =
            InMemoryMailbox::with_pages(vec![refs(&["a", "b"]), refs(&["c"]), refs(&["d"])])
                .fail_page(1);

        let outcome = search(&mailbox, "label:otp");

        assert!(matches!(
            outcome,
            SearchOutcome::Failed(Error::RemoteProtocol { status: Some(400), .. })
        ));
        assert_eq!(mailbox.list_calls().len(), 2);
    }

    /// Mailbox that hands back the same cursor forever
    struct StuckCursorMailbox {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl MailboxApi for StuckCursorMailbox {
        fn list_messages(
            &self,
            _request: ListRequest<'_>,
        ) -> crate::Result<crate::gmail::api::ListMessagesResponse> {
            let n = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(crate::gmail::api::ListMessagesResponse {
                messages: Some(vec![MessageRef::new(format!("m{}", n), "t")]),
                next_page_token: Some("same".to_string()),
                result_size_estimate: None,
            })
        }

        fn delete_message(&self, _user_id: &str, _id: &str) -> crate::Result<()> {
            Ok(())
        }

        fn trash_message(&self, _user_id: &str, _id: &str) -> crate::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_repeated_cursor_stops_paging() {
        let mailbox = StuckCursorMailbox {
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        let found = search(&mailbox, "from:loop").into_matches();

        let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m0", "m1"]);
        assert_eq!(mailbox.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_intermediate_page_is_skipped() {
        let mailbox = InMemoryMailbox::with_pages(vec![refs(&["a"]), Vec::new(), refs(&["b"])]);

        let found = search(&mailbox, "in:inbox").into_matches();

        assert_eq!(found.len(), 2);
        assert_eq!(mailbox.list_calls().len(), 3);
    }
}
