//! X (Twitter) API v2 platform implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::PlatformConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::text::LengthCounting;
use crate::types::ComposedPost;

/// Posts through `POST /2/tweets` using an OAuth 2.0 user bearer token
pub struct XPlatform {
    client: Client,
    api_base: String,
    token: SecretString,
    character_limit: usize,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct UserData {
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

impl XPlatform {
    pub fn new(config: &PlatformConfig, token: SecretString, character_limit: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
            character_limit,
            username: None,
        })
    }

    /// Account handle confirmed by the last successful authentication
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[async_trait]
impl Platform for XPlatform {
    async fn authenticate(&mut self) -> Result<()> {
        let response = self
            .client
            .get(self.url("/2/users/me"))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await
            .map_err(|e| map_transport_error(e, "authenticate"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, "authenticate").into());
        }

        let user: DataEnvelope<UserData> = response.json().await.map_err(|e| {
            PlatformError::Authentication(format!(
                "X authentication returned an unexpected response: {}",
                e
            ))
        })?;

        self.username = user.data.username;
        info!(username = ?self.username, "Authenticated with X");
        Ok(())
    }

    async fn post(&self, post: &ComposedPost) -> Result<String> {
        debug!(chars = post.len(), "Submitting post to X");

        let response = self
            .client
            .post(self.url("/2/tweets"))
            .bearer_auth(self.token.expose_secret())
            .json(&json!({ "text": post.text() }))
            .send()
            .await
            .map_err(|e| map_transport_error(e, "post"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, "post").into());
        }

        let created: DataEnvelope<TweetData> = response.json().await.map_err(|e| {
            PlatformError::Posting(format!(
                "X response parse error (post): {}. \
                    Suggestion: The post may have been created; check the account before retrying.",
                e
            ))
        })?;

        Ok(created.data.id)
    }

    fn name(&self) -> &str {
        "x"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(self.character_limit)
    }

    fn length_counting(&self) -> LengthCounting {
        LengthCounting::Weighted
    }

    fn is_configured(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

fn map_transport_error(error: reqwest::Error, context: &str) -> PlatformError {
    if error.is_timeout() {
        PlatformError::Network(format!(
            "X request timed out ({}): {}. \
                Suggestion: Check your network connection or raise platform.timeout.",
            context, error
        ))
    } else {
        PlatformError::Network(format!("X request failed ({}): {}", context, error))
    }
}

/// Map an X API error status onto a platform error
fn map_status(status: StatusCode, body: &str, context: &str) -> PlatformError {
    let code = status.as_u16();
    let body = body.trim();
    match code {
        401 => PlatformError::Authentication(format!(
            "X authentication failed ({}): HTTP 401 {}. \
                Suggestion: Verify your bearer token is valid and has not expired.",
            context, body
        )),
        403 if body.to_lowercase().contains("duplicate") => PlatformError::Validation(format!(
            "X rejected duplicate content ({}): {}",
            context, body
        )),
        403 => PlatformError::Authentication(format!(
            "X refused the request ({}): HTTP 403 {}. \
                Suggestion: Check that the token has tweet.write scope and the app has write access.",
            context, body
        )),
        400 | 422 => PlatformError::Validation(format!(
            "X rejected the content ({}): HTTP {} {}",
            context, code, body
        )),
        429 => PlatformError::RateLimit(format!(
            "X rate limit exceeded ({}): {}. \
                Suggestion: Wait for the rate limit window to reset.",
            context, body
        )),
        500..=599 => PlatformError::Network(format!(
            "X server error ({}): HTTP {} {}",
            context, code, body
        )),
        _ => PlatformError::Posting(format!("X HTTP error ({}): HTTP {} {}", context, code, body)),
    }
}
