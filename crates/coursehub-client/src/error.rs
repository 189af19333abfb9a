//! Error types for the CourseHub client.

use thiserror::Error;

/// Errors surfaced by the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level HTTP error (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response, reduced to the server's own message when one was sent.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The operation needs an authenticated session; no request was made.
    #[error("You must be logged in to {0}")]
    AuthRequired(String),

    /// Authentication was attempted and rejected by the server.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Client-side pre-submit validation failure.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Session file serialization error.
    #[error("Session file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error (session file access).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A newer catalog query started before this one finished; the result
    /// was discarded instead of being applied.
    #[error("query superseded by a newer one")]
    Superseded,
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// The server rejected a review because one already exists for this
    /// course and user. Matched on the message text since the backend sends
    /// no structured code for it.
    pub fn is_duplicate_review(&self) -> bool {
        matches!(
            self,
            ClientError::Api { message, .. }
                if message.to_lowercase().contains("review already exists")
        )
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ClientError::Superseded)
    }
}

impl From<envy::Error> for ClientError {
    fn from(err: envy::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}
