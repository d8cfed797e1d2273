//! Router error types

/// Error type for navigation and store operations
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("api error: {0}")]
    Api(#[from] starlight_api::ApiError),

    #[error("storage error: {0}")]
    Storage(#[from] starlight_common::CommonError),

    #[error("navigation error: {0}")]
    Navigation(String),
}

pub type Result<T> = std::result::Result<T, RouterError>;
