//! API error types

/// Error type for API client operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,

    #[error("http status {0}")]
    Status(u16),

    #[error("server returned error: code={code}, message={message}")]
    Envelope { code: i64, message: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("unknown api operation: {0}")]
    UnknownOperation(String),

    #[error("response decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Map a transport-level reqwest failure into its error category
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error.to_string())
        }
    }
}
