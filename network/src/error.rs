use thiserror::Error;

/// Why a request could not be built. Nothing is sent when building fails.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Query parameter '{0}' must be a string, number or bool")]
    UnsupportedQueryValue(String),

    #[error("Body encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Failed to build request: {0}")]
    Build(#[from] EncodingError),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request was replaced by a newer one")]
    Cancelled,
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout
        } else {
            NetworkError::Transport(e.to_string())
        }
    }
}
