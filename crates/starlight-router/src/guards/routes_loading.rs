//! Dynamic route loading guard
//!
//! Runs after authentication. On the first navigation of a logged-in
//! session it fetches the menu tree, registers the dynamic routes and
//! restarts the navigation so the target resolves against the full
//! table. A navigation that fell into the not-found fallback retries
//! the originally requested path instead.

use std::sync::Arc;

use async_trait::async_trait;
use starlight_common::AppConfig;

use crate::error::Result;
use crate::guards::{GuardOutcome, NavigationGuard};
use crate::route::sentinel;
use crate::router::ResolvedRoute;
use crate::store::{AuthenticationStore, DynamicRouteStore};

pub struct RoutesLoadingGuard {
    config: Arc<AppConfig>,
    auth: Arc<AuthenticationStore>,
    routes: Arc<DynamicRouteStore>,
}

impl RoutesLoadingGuard {
    pub fn new(
        config: Arc<AppConfig>,
        auth: Arc<AuthenticationStore>,
        routes: Arc<DynamicRouteStore>,
    ) -> Self {
        Self {
            config,
            auth,
            routes,
        }
    }
}

#[async_trait]
impl NavigationGuard for RoutesLoadingGuard {
    fn name(&self) -> &'static str {
        "routes-loading"
    }

    async fn before(&self, to: &ResolvedRoute, _from: &ResolvedRoute) -> Result<GuardOutcome> {
        if !self.auth.is_logged_in() || self.routes.is_fetched() {
            return Ok(GuardOutcome::Allow);
        }
        if to
            .name
            .as_ref()
            .is_some_and(|name| self.config.ignore_fetch_menus_route_names.contains(name))
        {
            return Ok(GuardOutcome::Allow);
        }

        self.routes.load_routes().await?;

        // Retry against the now-complete table
        let retry = if to.name.as_deref() == Some(sentinel::NOT_FOUND_NAME) {
            to.redirected_from
                .clone()
                .unwrap_or_else(|| to.full_path.clone())
        } else {
            to.full_path.clone()
        };
        Ok(GuardOutcome::Redirect(retry))
    }
}
