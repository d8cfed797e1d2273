//! Instant message wire model

use serde::{Deserialize, Serialize};

/// Frame discriminator for instant messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstantMessageType {
    Ping,
    Pong,
    Push,
    JoinGroup,
    SingleChat,
    GroupChat,
}

/// A single realtime message frame; transient, never persisted
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub message_type: InstantMessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl InstantMessage {
    pub fn ping() -> Self {
        Self {
            from: None,
            to: None,
            message_type: InstantMessageType::Ping,
            content: None,
            extra: None,
        }
    }

    pub fn chat(to: &str, content: &str) -> Self {
        Self {
            from: None,
            to: Some(to.to_string()),
            message_type: InstantMessageType::SingleChat,
            content: Some(content.to_string()),
            extra: None,
        }
    }
}
