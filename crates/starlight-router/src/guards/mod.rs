//! Navigation guard pipeline
//!
//! Guards run strictly in registration order; a later guard never
//! starts before the previous one resolved. A redirect restarts the
//! whole pipeline on the new target, a denial leaves the current
//! route unchanged, and guard errors are reported through the
//! notifier by the dispatcher.

mod authentication;
mod keep_alive;
mod routes_loading;

pub use authentication::AuthenticationGuard;
pub use keep_alive::KeepAliveHook;
pub use routes_loading::RoutesLoadingGuard;

use async_trait::async_trait;

use crate::error::Result;
use crate::route::sentinel;
use crate::router::ResolvedRoute;

/// What a guard decided about a navigation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    /// Restart the pipeline on this target
    Redirect(String),
    /// Stop; the current route stays as it was
    Deny,
}

#[async_trait]
pub trait NavigationGuard: Send + Sync {
    fn name(&self) -> &'static str;

    async fn before(&self, to: &ResolvedRoute, from: &ResolvedRoute) -> Result<GuardOutcome>;
}

/// Post-commit hook, run after a navigation is accepted
pub trait AfterHook: Send + Sync {
    fn after(&self, to: &ResolvedRoute, from: &ResolvedRoute);
}

/// Login target carrying the interrupted path, except for sentinel
/// routes that make no sense as a post-login destination. The check
/// goes by route name so any path that resolved into the not-found
/// fallback is covered too.
pub fn login_redirect_target(to: &ResolvedRoute) -> String {
    let sentinel_target = to
        .name
        .as_deref()
        .is_some_and(|name| sentinel::NO_REDIRECT_NAMES.contains(&name));
    if sentinel_target {
        sentinel::LOGIN_PATH.to_string()
    } else {
        let encoded: String =
            url::form_urlencoded::byte_serialize(to.full_path.as_bytes()).collect();
        format!("{}?redirect={}", sentinel::LOGIN_PATH, encoded)
    }
}
