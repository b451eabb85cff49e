//! Query executor
//!
//! Runs a mailbox search to completion, following page cursors, and
//! reports the full ordered match set or the reason the search failed.

mod messages;

pub use messages::{SearchOptions, SearchOutcome, search, search_with};
