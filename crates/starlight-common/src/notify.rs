//! User-facing notification sink
//!
//! All user-visible messages (API failures, guard errors, messaging
//! state changes) flow through one `Notifier`. Library code never
//! prints; the embedding shell decides how notifications render.

use parking_lot::Mutex;
use tracing::{error, info, warn};

/// Severity of a user-facing notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Sink for user-facing notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotifyLevel, title: &str, message: &str);

    fn info(&self, title: &str, message: &str) {
        self.notify(NotifyLevel::Info, title, message);
    }

    fn success(&self, title: &str, message: &str) {
        self.notify(NotifyLevel::Success, title, message);
    }

    fn warning(&self, title: &str, message: &str) {
        self.notify(NotifyLevel::Warning, title, message);
    }

    fn error(&self, title: &str, message: &str) {
        self.notify(NotifyLevel::Error, title, message);
    }
}

/// Default notifier that forwards to tracing
#[derive(Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, title: &str, message: &str) {
        match level {
            NotifyLevel::Info | NotifyLevel::Success => info!(title, "{}", message),
            NotifyLevel::Warning => warn!(title, "{}", message),
            NotifyLevel::Error => error!(title, "{}", message),
        }
    }
}

/// Notifier that records every call, for assertions and diagnostics
#[derive(Default)]
pub struct RecordingNotifier {
    records: Mutex<Vec<(NotifyLevel, String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded notifications
    pub fn records(&self) -> Vec<(NotifyLevel, String, String)> {
        self.records.lock().clone()
    }

    /// Number of notifications at the given level
    pub fn count_at(&self, level: NotifyLevel) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|(l, _, _)| *l == level)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotifyLevel, title: &str, message: &str) {
        self.records
            .lock()
            .push((level, title.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.warning("auth", "login required");
        notifier.error("api", "connection failed");

        let records = notifier.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, NotifyLevel::Warning);
        assert_eq!(records[1].2, "connection failed");
        assert_eq!(notifier.count_at(NotifyLevel::Error), 1);
    }
}
