//! Error types shared across the starlight foundations

/// Error type for configuration and storage operations
#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, CommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CommonError::InvalidConfig {
            key: "STARLIGHT_REQUEST_TIMEOUT_MS".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration value for STARLIGHT_REQUEST_TIMEOUT_MS: abc"
        );
    }
}
