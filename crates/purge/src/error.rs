//! Error kinds surfaced by the purge crate

use std::path::PathBuf;

/// Result alias for purge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring, authenticating, or talking to the mailbox
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required local file is missing or malformed
    #[error("{message} ({path}). {hint}")]
    Configuration {
        path: PathBuf,
        message: String,
        hint: String,
    },

    /// The job definition itself is unusable (e.g. empty query)
    #[error("invalid job: {0}")]
    InvalidJob(String),

    /// Consent, token exchange, or token refresh failed
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The remote API rejected a call or could not be reached
    #[error("{}", remote_display(.status, .message))]
    RemoteProtocol { status: Option<u16>, message: String },
}

fn remote_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("remote API error ({}): {}", code, message),
        None => format!("remote API error: {}", message),
    }
}

impl Error {
    pub(crate) fn authentication(err: anyhow::Error) -> Self {
        Self::Authentication(format!("{:#}", err))
    }

    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        Self::RemoteProtocol {
            status: None,
            message: err.to_string(),
        }
    }

    /// True for the configuration kinds (missing descriptor or bad job)
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::InvalidJob(_))
    }
}
