//! The forge API abstraction the fetcher dispatches through (SPEC_FULL.md
//! §6). The hard core depends only on the `ForgeClient` trait;
//! `ReqwestForgeClient` is the minimal concrete collaborator needed to run
//! the CLI end to end.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ClientError {
    #[error("{method} {url}: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Rate-limit and status metadata carried alongside a successful response,
/// used for budget tracking (`repowarden_fetch::budget`).
#[derive(Debug, Clone, Default)]
pub struct ResponseMeta {
    pub status: u16,
    pub rate_limit_remaining: Option<i64>,
    pub rate_limit_reset: Option<i64>,
}

/// The abstraction dependency providers call through to reach the forge API.
/// Providers never construct their own HTTP client — they receive one
/// through `FetchCtx`.
#[async_trait]
pub trait ForgeClient: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<(serde_json::Value, ResponseMeta), ClientError>;
}

/// Default `reqwest`-backed implementation.
pub struct ReqwestForgeClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestForgeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ForgeClient for ReqwestForgeClient {
    async fn get_json(&self, path: &str) -> Result<(serde_json::Value, ResponseMeta), ClientError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                method: "GET".to_string(),
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let rate_limit_remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let rate_limit_reset = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.json::<serde_json::Value>().await.map_err(|e| ClientError::Transport {
            method: "GET".to_string(),
            url,
            message: e.to_string(),
        })?;

        Ok((
            body,
            ResponseMeta {
                status: status.as_u16(),
                rate_limit_remaining,
                rate_limit_reset,
            },
        ))
    }
}
