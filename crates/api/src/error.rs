use thiserror::Error;
use wfinterop_config::ConfigError;
use wfinterop_util::http::JsonParseError;

/// Errors raised while talking to a TRS or WES endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid service configuration: {message}")]
    InvalidService { message: String },

    #[error("Network error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}: {message}")]
    Status {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    #[error(transparent)]
    Json(#[from] JsonParseError),

    #[error("unexpected response shape from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    pub fn invalid_service(message: impl Into<String>) -> Self {
        Self::InvalidService { message: message.into() }
    }

    /// HTTP status of a non-success response, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
