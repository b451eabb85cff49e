//! Deletion actions
//!
//! Provides the orchestrator that searches a mailbox and removes every
//! matching message, one remote call per message.

mod handler;

pub use handler::{DeletionHandler, DeletionOptions, DeletionSummary, delete_matching};
