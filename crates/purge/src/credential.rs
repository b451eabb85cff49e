//! Credential provider
//!
//! Produces a fresh bearer credential for the single configured account.
//! A cached token is reused while fresh, refreshed when it carries a refresh
//! token, and otherwise replaced through the consent flow. Every new token is
//! written back to the cache so later runs skip consent.

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::ClientSecret;
use crate::error::Error;
use crate::gmail::GoogleOAuth;

/// Default token cache filename in the AutoDelete config directory
pub const TOKEN_FILE: &str = "token.json";

/// Bearer token plus refresh metadata, as persisted in the token cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is rejected
    pub expires_at: Option<i64>,
}

impl Credential {
    /// Tokens this close to expiry are treated as already expired
    pub const EXPIRY_MARGIN_SECS: i64 = 300;

    /// Build a credential from a token endpoint grant received at `now`
    pub fn from_grant(grant: TokenGrant, now: i64) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: grant.expires_in.map(|d| now + d as i64),
        }
    }

    /// Whether the access token is usable at `now`
    pub fn is_fresh_at(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at > now + Self::EXPIRY_MARGIN_SECS)
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(chrono::Utc::now().timestamp())
    }
}

/// Token response from the OAuth token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Source of new tokens: the consent flow and the refresh exchange
pub trait TokenSource {
    /// Run the (possibly interactive) consent flow
    fn consent(&self) -> Result<TokenGrant>;

    /// Exchange a refresh token for a new access token
    fn refresh(&self, refresh_token: &str) -> Result<TokenGrant>;
}

/// Whether the provider may fall back to the consent flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentPolicy {
    /// Open the browser consent flow when no usable token exists
    Interactive,
    /// Fail instead; the operator must run `autodelete authorize` first
    Forbidden,
}

/// JSON token cache on disk
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the default token cache path (~/.config/autodelete/token.json)
    pub fn default_path() -> Option<PathBuf> {
        config::config_path(TOKEN_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached credential; a missing or unreadable cache yields `None`
    pub fn load(&self) -> Option<Credential> {
        if !self.path.exists() {
            return None;
        }
        match config::load_json_file(&self.path) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!("Ignoring unreadable token cache: {:#}", e);
                None
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> crate::Result<()> {
        config::save_json_file(&self.path, credential).map_err(|e| Error::Configuration {
            path: self.path.clone(),
            message: format!("{:#}", e),
            hint: "Check that the token cache location is writable".to_string(),
        })
    }
}

/// Obtains fresh credentials from a token cache and a token source
pub struct CredentialProvider<S> {
    source: S,
    cache: TokenCache,
}

impl CredentialProvider<GoogleOAuth> {
    /// Build a provider backed by Google's OAuth endpoints
    ///
    /// # Errors
    /// `Error::Configuration` if the client-secret descriptor is missing.
    pub fn from_files(credentials_file: &Path, token_file: &Path) -> crate::Result<Self> {
        let secret = ClientSecret::load(credentials_file)?;
        Ok(Self::new(GoogleOAuth::new(secret), TokenCache::new(token_file)))
    }
}

impl<S: TokenSource> CredentialProvider<S> {
    pub fn new(source: S, cache: TokenCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Return a fresh credential, refreshing or re-consenting as needed
    pub fn get(&self, policy: ConsentPolicy) -> crate::Result<Credential> {
        if let Some(cached) = self.cache.load() {
            if cached.is_fresh() {
                info!("Using cached credential from {}", self.cache.path().display());
                return Ok(cached);
            }

            if let Some(refresh_token) = cached.refresh_token.as_deref() {
                match self.refresh(refresh_token) {
                    Ok(credential) => return Ok(credential),
                    Err(e) => warn!("Token refresh failed, consent required: {}", e),
                }
            }
        }

        match policy {
            ConsentPolicy::Interactive => self.authorize(),
            ConsentPolicy::Forbidden => Err(Error::Authentication(format!(
                "no usable token in {}; run `autodelete authorize` once to create it",
                self.cache.path().display()
            ))),
        }
    }

    /// Run the consent flow unconditionally and cache the result
    pub fn authorize(&self) -> crate::Result<Credential> {
        info!("Starting consent flow");
        let grant = self.source.consent().map_err(Error::authentication)?;
        let credential = Credential::from_grant(grant, chrono::Utc::now().timestamp());
        if credential.refresh_token.is_none() {
            warn!("Consent grant carried no refresh token; later runs will need consent again");
        }
        self.cache.save(&credential)?;
        info!("Stored credential in {}", self.cache.path().display());
        Ok(credential)
    }

    fn refresh(&self, refresh_token: &str) -> crate::Result<Credential> {
        info!("Refreshing access token");
        let grant = self
            .source
            .refresh(refresh_token)
            .map_err(Error::authentication)?;
        let mut credential = Credential::from_grant(grant, chrono::Utc::now().timestamp());
        // Google omits the refresh token on refresh responses
        if credential.refresh_token.is_none() {
            credential.refresh_token = Some(refresh_token.to_string());
        }
        self.cache.save(&credential)?;
        Ok(credential)
    }
}

/// Obtain a fresh credential, opening the browser consent flow if needed
pub fn obtain(credentials_file: &Path, token_file: &Path) -> crate::Result<Credential> {
    CredentialProvider::from_files(credentials_file, token_file)?.get(ConsentPolicy::Interactive)
}

/// Obtain a fresh credential without ever prompting the user
pub fn obtain_non_interactive(
    credentials_file: &Path,
    token_file: &Path,
) -> crate::Result<Credential> {
    CredentialProvider::from_files(credentials_file, token_file)?.get(ConsentPolicy::Forbidden)
}
