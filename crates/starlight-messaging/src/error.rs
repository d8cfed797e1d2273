//! Messaging error types

/// Error type for the messaging client
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connection not open")]
    NotConnected,

    #[error("message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MessagingError>;
