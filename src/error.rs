//! Error types for the intent resolution core
//!
//! Business-logic non-matches (no room found, ambiguous device name, a score
//! below the confidence threshold) are never errors: they surface as `None`
//! so the caller falls through to the generative pipeline. The variants here
//! cover store access and genuinely unexpected faults.

use thiserror::Error;

/// Result type alias for intent resolution operations
pub type Result<T> = std::result::Result<T, IntentError>;

/// Error types for intent resolution and fast-path execution
#[derive(Error, Debug)]
pub enum IntentError {
    /// Object/enum store access errors
    #[error("Store error: {0}")]
    Store(String),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// State write errors
    #[error("State write failed: {0}")]
    StateWrite(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found errors (states, groupings)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl IntentError {
    /// Create a store access error
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state write error
    pub fn state_write<S: Into<String>>(msg: S) -> Self {
        Self::StateWrite(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Check if the error is worth retrying from the embedder's perspective
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntentError::Store(_) | IntentError::StateWrite(_))
    }
}
