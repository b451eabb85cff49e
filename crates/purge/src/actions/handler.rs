//! Deletion orchestrator
//!
//! Coordinates a search with per-message delete calls.

use log::{error, info};

use crate::job::{DeleteMode, Job};
use crate::query::{SearchOptions, SearchOutcome, search_with};
use crate::remote::{DEFAULT_USER_ID, MailboxApi};

/// How a deletion run treats its matches
#[derive(Debug, Clone)]
pub struct DeletionOptions {
    pub user_id: String,
    pub mode: DeleteMode,
    pub dry_run: bool,
    pub include_spam_trash: bool,
}

impl Default for DeletionOptions {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            mode: DeleteMode::Permanent,
            dry_run: false,
            include_spam_trash: false,
        }
    }
}

impl From<&Job> for DeletionOptions {
    fn from(job: &Job) -> Self {
        Self {
            user_id: job.user_id.clone(),
            mode: job.mode,
            dry_run: job.dry_run,
            include_spam_trash: job.include_spam_trash,
        }
    }
}

/// What a completed deletion run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionSummary {
    /// The search matched nothing
    NoMatches,
    /// The search was rejected; nothing was deleted
    SearchFailed,
    /// Dry run; `matched` messages would have been removed
    DryRun { matched: usize },
    /// Every matched message was removed
    Deleted { count: usize },
}

/// Handler that deletes every message matching a query
///
/// Deletion is strictly sequential. The first failed call aborts the run:
/// messages before it stay deleted, messages after it are never touched.
pub struct DeletionHandler<'a> {
    mailbox: &'a dyn MailboxApi,
    options: DeletionOptions,
}

impl<'a> DeletionHandler<'a> {
    /// Create a new deletion handler
    pub fn new(mailbox: &'a dyn MailboxApi, options: DeletionOptions) -> Self {
        Self { mailbox, options }
    }

    /// Search for `query` and remove each match in the order returned
    ///
    /// # Errors
    /// The first failing delete (or trash) call, as `Error::RemoteProtocol`.
    /// A failed search is not an error; it yields `DeletionSummary::SearchFailed`.
    pub fn delete_matching(&self, query: &str) -> crate::Result<DeletionSummary> {
        let search_options = SearchOptions {
            include_spam_trash: self.options.include_spam_trash,
        };

        let refs = match search_with(self.mailbox, query, &self.options.user_id, search_options) {
            SearchOutcome::Matches(refs) => refs,
            SearchOutcome::Failed(_) => {
                info!("Search failed; no messages were deleted.");
                return Ok(DeletionSummary::SearchFailed);
            }
        };

        if refs.is_empty() {
            info!("There was no message matching the query.");
            return Ok(DeletionSummary::NoMatches);
        }

        if self.options.dry_run {
            for message in &refs {
                info!(
                    "Dry run: would {} message with id: {}",
                    self.verb(),
                    message.id
                );
            }
            return Ok(DeletionSummary::DryRun {
                matched: refs.len(),
            });
        }

        for (done, message) in refs.iter().enumerate() {
            if let Err(e) = self.remove(&message.id) {
                error!(
                    "Failed to {} message {} after {} of {} succeeded: {}",
                    self.verb(),
                    message.id,
                    done,
                    refs.len(),
                    e
                );
                return Err(e);
            }
            match self.options.mode {
                DeleteMode::Permanent => {
                    info!("Message with id: {} deleted successfully.", message.id)
                }
                DeleteMode::Trash => info!("Message with id: {} moved to trash.", message.id),
            }
        }

        Ok(DeletionSummary::Deleted { count: refs.len() })
    }

    fn remove(&self, id: &str) -> crate::Result<()> {
        match self.options.mode {
            DeleteMode::Permanent => self.mailbox.delete_message(&self.options.user_id, id),
            DeleteMode::Trash => self.mailbox.trash_message(&self.options.user_id, id),
        }
    }

    fn verb(&self) -> &'static str {
        match self.options.mode {
            DeleteMode::Permanent => "delete",
            DeleteMode::Trash => "trash",
        }
    }
}

/// Permanently delete every message matching `query` in `user_id`'s mailbox
pub fn delete_matching(
    mailbox: &dyn MailboxApi,
    query: &str,
    user_id: &str,
) -> crate::Result<DeletionSummary> {
    let options = DeletionOptions {
        user_id: user_id.to_string(),
        ..Default::default()
    };
    DeletionHandler::new(mailbox, options).delete_matching(query)
}
