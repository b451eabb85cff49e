//! Client-secret descriptor loading
//!
//! Reads the OAuth client descriptor downloaded from the Google Cloud Console.
//! Both the "installed" (desktop) and "web" credential layouts are accepted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Default descriptor filename in the AutoDelete config directory
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Where operators obtain the descriptor
const CREDENTIALS_HINT: &str = "Download it from https://developers.google.com/gmail/api/quickstart \
     (enable the Gmail API, create a Desktop OAuth client, download the JSON)";

/// OAuth client identity for Gmail API access
#[derive(Debug, Clone)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientSecret {
    /// Load the descriptor at `path`
    ///
    /// # Errors
    /// `Error::Configuration` when the file is missing or unparsable; the
    /// message carries the absolute path and where to get the file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let absolute = absolute_path(path);
        if !path.exists() {
            return Err(Error::Configuration {
                path: absolute,
                message: "Can't find credentials file".to_string(),
                hint: CREDENTIALS_HINT.to_string(),
            });
        }

        let creds: GoogleCredentialFile =
            config::load_json_file(path).map_err(|e| Error::Configuration {
                path: absolute.clone(),
                message: format!("{:#}", e),
                hint: CREDENTIALS_HINT.to_string(),
            })?;

        Self::from_credential_file(creds).map_err(|e| Error::Configuration {
            path: absolute,
            message: e.to_string(),
            hint: CREDENTIALS_HINT.to_string(),
        })
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Get the default descriptor path (~/.config/autodelete/credentials.json)
    pub fn default_path() -> Option<PathBuf> {
        config::config_path(CREDENTIALS_FILE)
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
