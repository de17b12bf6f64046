//! Commit API error types

use thiserror::Error;

/// Errors that can occur while querying commit history
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
