//! Error types for config store operations.

use thiserror::Error;

/// Errors returned by a [`ConfigStoreClient`](super::ConfigStoreClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigStoreError {
    /// The request never produced a response (connect failure, timeout, ...).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The store answered with a non-success status.
    #[error("Config store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The store answered successfully but the response was unusable.
    #[error("Invalid config store response: {message}")]
    InvalidResponse { message: String },

    /// The client itself is misconfigured.
    #[error("Config store client configuration error: {message}")]
    Config { message: String },
}

impl ConfigStoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status { status, body: body.into() }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

impl From<reqwest::Error> for ConfigStoreError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::transport(format!("request timed out: {}", error))
        } else {
            Self::transport(error.to_string())
        }
    }
}
