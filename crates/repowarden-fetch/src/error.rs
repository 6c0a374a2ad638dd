//! Fetcher-level error taxonomy (SPEC_FULL.md §7).

use repowarden_core::DependencyKey;
use thiserror::Error;

/// Errors raised while building or operating the fetcher.
#[derive(Debug, Error, Clone)]
pub enum FetchError {
    #[error("dependency key {0:?} is already registered with a provider")]
    DuplicateProvider(String),

    #[error("no provider registered for dependency key {0:?}")]
    UnknownKey(String),

    #[error("{message}")]
    Provider {
        key: String,
        message: String,
        /// HTTP status code, when the failure came from the forge API.
        status: Option<u16>,
    },
}

impl FetchError {
    pub fn provider(key: DependencyKey, message: impl Into<String>, status: Option<u16>) -> Self {
        FetchError::Provider {
            key: key.as_str().to_string(),
            message: message.into(),
            status,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Provider { status, .. } => *status,
            _ => None,
        }
    }
}
