//! Shared foundations for the starlight console client
//!
//! This crate provides:
//! - Application configuration with environment overrides
//! - A prefixed key-value storage with optional per-key expiry
//! - The notification sink used for all user-facing messages
//! - The session token holder shared by the API and messaging layers

pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod storage;

pub use config::{AppConfig, ResultCodes};
pub use error::CommonError;
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use session::SessionTokens;
pub use storage::{ScopedStorage, StorageBackend};
