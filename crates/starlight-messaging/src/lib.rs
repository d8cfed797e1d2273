//! Reconnecting realtime messaging client.
//!
//! Wraps a WebSocket connection to the instant message server with a
//! heartbeat, linear-backoff reconnection, and broadcast fan-out of
//! incoming frames.

pub mod client;
pub mod error;
pub mod model;

pub use client::{ConnectionState, MessagingClient, MessagingConfig, reconnect_delay};
pub use error::{MessagingError, Result};
pub use model::{InstantMessage, InstantMessageType};
