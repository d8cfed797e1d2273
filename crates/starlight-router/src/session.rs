//! Session coordinator
//!
//! The router-side `ApiEventHandler`. Envelope failures that mean the
//! session is gone (unauthorized, token expired) clear authentication
//! and force exactly one replace-navigation to the login page carrying
//! the interrupted location; every kind is surfaced as exactly one
//! notification.

use std::sync::Arc;

use async_trait::async_trait;
use starlight_api::{ApiEventHandler, FailureKind, RequestMethod, notify_envelope_failure};
use starlight_common::Notifier;
use tracing::debug;

use crate::guards::login_redirect_target;
use crate::router::{NavigationOutcome, Router};
use crate::store::AuthenticationStore;

pub struct SessionCoordinator {
    auth: Arc<AuthenticationStore>,
    router: Arc<Router>,
    notifier: Arc<dyn Notifier>,
}

impl SessionCoordinator {
    pub fn new(
        auth: Arc<AuthenticationStore>,
        router: Arc<Router>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            auth,
            router,
            notifier,
        }
    }

    async fn force_login(&self) {
        self.auth.clear_authentication();

        let current = self.router.current_route();
        let target = login_redirect_target(&current);
        if let NavigationOutcome::Cancelled = self.router.replace(&target).await {
            debug!("forced login navigation was cancelled");
        }
    }
}

#[async_trait]
impl ApiEventHandler for SessionCoordinator {
    async fn on_envelope_failure(
        &self,
        kind: FailureKind,
        _code: i64,
        message: &str,
        method: RequestMethod,
        uri: &str,
    ) {
        notify_envelope_failure(self.notifier.as_ref(), kind, message, method, uri);

        if matches!(kind, FailureKind::Unauthorized | FailureKind::TokenExpired) {
            self.force_login().await;
        }
    }
}
