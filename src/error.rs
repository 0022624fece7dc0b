//! Errors raised while talking to the recommendation backend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Could not reach the server: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Short text suitable for the transcript or the detail panel.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "the server could not be reached".to_string(),
            ApiError::Status { status, .. } => format!("the server answered {}", status),
            ApiError::Decode { .. } => "the server sent a response I could not read".to_string(),
            ApiError::InvalidUrl(url) => format!("the server address {} is invalid", url),
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
