//! Purge crate - Business logic for mailbox cleanup jobs
//!
//! This crate provides:
//! - OAuth credential acquisition with an on-disk token cache
//! - Gmail API client for listing, deleting, and trashing messages
//! - A mailbox trait with an in-memory implementation for tests
//! - Paginated search that reports failures distinctly from empty results
//! - The deletion orchestrator driven by a job definition
//!
//! Everything is synchronous and single-threaded; each remote call blocks.

pub mod actions;
pub mod config;
pub mod credential;
pub mod error;
pub mod gmail;
pub mod job;
pub mod query;
pub mod remote;

pub use self::actions::{DeletionHandler, DeletionOptions, DeletionSummary, delete_matching};
pub use self::config::ClientSecret;
pub use self::credential::{
    ConsentPolicy, Credential, CredentialProvider, TokenCache, TokenGrant, TokenSource, obtain,
    obtain_non_interactive,
};
pub use self::error::{Error, Result};
pub use self::gmail::{GmailClient, GoogleOAuth, api::MessageRef};
pub use self::job::{DeleteMode, Job, JobFile, JobFiles};
pub use self::query::{SearchOptions, SearchOutcome, search, search_with};
pub use self::remote::{DEFAULT_USER_ID, InMemoryMailbox, ListRequest, MailboxApi};
