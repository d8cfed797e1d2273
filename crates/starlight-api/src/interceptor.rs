//! Response classification and side-effect dispatch
//!
//! Single point where transport and envelope failures are classified
//! and surfaced to the user. Downstream callers receive an already
//! classified `ApiError` and must not re-display it; they only clean
//! up their own UI state.

use std::sync::Arc;

use async_trait::async_trait;
use starlight_common::Notifier;
use starlight_common::config::{ResultCodes, SERVICE_UNAVAILABLE_CODE};
use tracing::warn;

use crate::error::ApiError;
use crate::model::RequestMethod;

/// Classified envelope failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// No or invalid session
    Unauthorized,
    /// Authenticated but forbidden
    AccessDenied,
    /// Session lapsed
    TokenExpired,
    /// Backend service down (fixed 503 sentinel)
    ServiceUnavailable,
    /// Anything else; the server message is surfaced verbatim
    Unknown,
}

/// Classify an envelope result code against the configured code table
pub fn classify(code: i64, codes: &ResultCodes) -> FailureKind {
    if code == codes.unauthorized {
        FailureKind::Unauthorized
    } else if code == codes.access_denied {
        FailureKind::AccessDenied
    } else if code == codes.token_expired {
        FailureKind::TokenExpired
    } else if code == SERVICE_UNAVAILABLE_CODE {
        FailureKind::ServiceUnavailable
    } else {
        FailureKind::Unknown
    }
}

/// Hook driving the side effects of a classified envelope failure.
///
/// The router layer installs an implementation that clears the session
/// and forces navigation to the login route; without one, the default
/// handler only notifies.
#[async_trait]
pub trait ApiEventHandler: Send + Sync {
    async fn on_envelope_failure(
        &self,
        kind: FailureKind,
        code: i64,
        message: &str,
        method: RequestMethod,
        uri: &str,
    );
}

/// Fallback handler: notifications only, no navigation
pub struct NotifyOnlyHandler {
    notifier: Arc<dyn Notifier>,
}

impl NotifyOnlyHandler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ApiEventHandler for NotifyOnlyHandler {
    async fn on_envelope_failure(
        &self,
        kind: FailureKind,
        _code: i64,
        message: &str,
        method: RequestMethod,
        uri: &str,
    ) {
        notify_envelope_failure(self.notifier.as_ref(), kind, message, method, uri);
    }
}

/// Standard notification text per envelope failure kind
pub fn notify_envelope_failure(
    notifier: &dyn Notifier,
    kind: FailureKind,
    message: &str,
    method: RequestMethod,
    uri: &str,
) {
    match kind {
        FailureKind::Unauthorized => notifier.warning("API", "Login required!"),
        FailureKind::AccessDenied => notifier.warning(
            "API",
            &format!(
                "{message} Request {method} - {uri} requires authorization, contact an administrator."
            ),
        ),
        FailureKind::TokenExpired => notifier.info("API", "Session expired!"),
        FailureKind::ServiceUnavailable => notifier.error(
            "API",
            "Service unavailable, check that the backend is running and reachable.",
        ),
        FailureKind::Unknown => notifier.error("API", message),
    }
}

/// Surface a transport-level failure as exactly one user message.
///
/// Cancellation stays silent unless the rapid-duplicate diagnostic
/// flag is on, in which case it is logged and shown as a warning.
pub fn notify_transport_error(
    notifier: &dyn Notifier,
    error: &ApiError,
    show_rapid_duplicate_warning: bool,
) {
    match error {
        ApiError::Network(_) => notifier.error(
            "API",
            "API connection failed: network unreachable or cross-origin blocked.",
        ),
        ApiError::Timeout => notifier.error("API", "API request timed out!"),
        ApiError::Status(code) => {
            notifier.error("API", &format!("Unexpected API status code: {code}!"))
        }
        ApiError::Cancelled => {
            if show_rapid_duplicate_warning {
                warn!("request cancelled by an identical rapid duplicate");
                notifier.warning(
                    "API",
                    "Request cancelled: an identical request was issued in rapid succession; check the calling code.",
                );
            }
        }
        ApiError::Decode(detail) => {
            notifier.error("API", &format!("Failed to process API response: {detail}"))
        }
        ApiError::Envelope { .. } | ApiError::UnknownOperation(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlight_common::RecordingNotifier;
    use starlight_common::notify::NotifyLevel;

    fn codes() -> ResultCodes {
        ResultCodes::default()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(403, &codes()), FailureKind::Unauthorized);
        assert_eq!(classify(405, &codes()), FailureKind::AccessDenied);
        assert_eq!(classify(1008, &codes()), FailureKind::TokenExpired);
        assert_eq!(classify(503, &codes()), FailureKind::ServiceUnavailable);
        assert_eq!(classify(9999, &codes()), FailureKind::Unknown);
    }

    #[test]
    fn test_classify_honors_configured_codes() {
        let codes = ResultCodes {
            success: 0,
            unauthorized: 401,
            access_denied: 403,
            token_expired: 40003,
        };
        assert_eq!(classify(401, &codes), FailureKind::Unauthorized);
        assert_eq!(classify(403, &codes), FailureKind::AccessDenied);
        assert_eq!(classify(40003, &codes), FailureKind::TokenExpired);
    }

    #[test]
    fn test_cancellation_silent_by_default() {
        let notifier = RecordingNotifier::new();
        notify_transport_error(&notifier, &ApiError::Cancelled, false);
        assert!(notifier.records().is_empty());

        notify_transport_error(&notifier, &ApiError::Cancelled, true);
        assert_eq!(notifier.count_at(NotifyLevel::Warning), 1);
    }

    #[test]
    fn test_transport_messages() {
        let notifier = RecordingNotifier::new();
        notify_transport_error(&notifier, &ApiError::Status(502), false);
        let records = notifier.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].2.contains("502"));
    }
}
