//! Gmail OAuth2 authentication
//!
//! Implements the OAuth2 authorization code flow against Google's endpoints.
//! Uses a local HTTP server to receive the OAuth callback.
//! Uses synchronous HTTP (ureq), matching the rest of the crate.

use anyhow::{Context, Result};
use log::{info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use url::Url;

use crate::config::ClientSecret;
use crate::credential::{TokenGrant, TokenSource};

/// Full read-write mailbox scope; permanent deletion requires it
pub const GMAIL_FULL_SCOPE: &str = "https://mail.google.com/";

/// Token source backed by Google's OAuth2 endpoints
pub struct GoogleOAuth {
    secret: ClientSecret,
}

impl GoogleOAuth {
    const AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Port range to try for local OAuth callback server
    const PORT_RANGE_START: u16 = 8080;
    const PORT_RANGE_END: u16 = 8090;

    pub fn new(secret: ClientSecret) -> Self {
        Self { secret }
    }

    /// Build the consent URL the user is sent to
    fn authorization_url(&self, redirect_uri: &str) -> Result<Url> {
        Url::parse_with_params(
            Self::AUTH_URL,
            &[
                ("client_id", self.secret.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", GMAIL_FULL_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .context("Failed to build authorization URL")
    }

    /// Start a local TCP server on an available port
    fn start_local_server(&self) -> Result<(TcpListener, u16)> {
        for port in Self::PORT_RANGE_START..=Self::PORT_RANGE_END {
            if let Ok(listener) = TcpListener::bind(format!("127.0.0.1:{}", port)) {
                return Ok((listener, port));
            }
        }
        anyhow::bail!(
            "Could not bind to any port in range {}-{}",
            Self::PORT_RANGE_START,
            Self::PORT_RANGE_END
        )
    }

    /// Wait for OAuth callback and extract authorization code
    fn wait_for_callback(&self, listener: TcpListener) -> Result<String> {
        let (mut stream, _) = listener.accept().context("Failed to accept connection")?;

        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .context("Failed to read request")?;

        let callback = parse_callback(&request_line);

        let (status, body) = match callback {
            Ok(_) => ("200 OK", "Authentication successful! You can close this window."),
            Err(_) => ("400 Bad Request", "Authentication failed. Please try again."),
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
            status, body
        );
        stream.write_all(response.as_bytes()).ok();

        callback
    }

    fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .context("Failed to exchange authorization code")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse token response")
    }
}

impl TokenSource for GoogleOAuth {
    fn consent(&self) -> Result<TokenGrant> {
        let (listener, port) = self.start_local_server()?;
        let redirect_uri = format!("http://localhost:{}", port);
        let auth_url = self.authorization_url(&redirect_uri)?;

        println!("\n=== Gmail Authentication Required ===");
        println!("Opening browser for authentication...");
        println!("If the browser doesn't open, visit: {}", auth_url);

        if let Err(e) = open::that(auth_url.as_str()) {
            warn!("Failed to open browser: {}", e);
        }

        info!("Waiting for OAuth callback on port {}", port);
        let code = self.wait_for_callback(listener)?;

        let token = self.exchange_code(&code, &redirect_uri)?;
        println!("Authentication successful!\n");
        Ok(token)
    }

    fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        let mut response = ureq::post(Self::TOKEN_URL)
            .send_form([
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .context("Failed to refresh access token")?;

        response
            .body_mut()
            .read_json()
            .context("Failed to parse refresh token response")
    }
}

/// Extract the authorization code from a callback request line
///
/// Format: `GET /?code=AUTH_CODE&scope=... HTTP/1.1`
fn parse_callback(request_line: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed OAuth callback request")?;
    let url = Url::parse("http://localhost")
        .and_then(|base| base.join(target))
        .context("Malformed OAuth callback target")?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => anyhow::bail!("OAuth error: {}", value),
            "code" => code = Some(value.into_owned()),
            _ => {}
        }
    }

    code.context("No authorization code received")
}
