//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read image {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Extraction error: {0}")]
    Extraction(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Upstream(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Error::Upstream(format!("connection failed: {}", err))
        } else if let Some(status) = err.status() {
            Error::Upstream(format!("status {}: {}", status, err))
        } else {
            Error::Upstream(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
