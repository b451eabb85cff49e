//! Remote mailbox abstraction
//!
//! Defines the operations the cleanup job performs against a mailbox.
//! The Gmail client is the production implementation; the in-memory
//! mailbox scripts pages and failures for tests.

mod memory;
mod traits;

pub use memory::InMemoryMailbox;
pub use traits::{DEFAULT_USER_ID, ListRequest, MailboxApi};
