//! Authentication guard
//!
//! First guard in the pipeline. Decides whether the session may reach
//! the target at all: logged-in users are bounced away from the login
//! page and get their profile loaded on first navigation; anonymous
//! mode synthesizes a persistent identity instead of redirecting;
//! everyone else lands on the login page with the interrupted target
//! in the `redirect` query.

use std::sync::Arc;

use async_trait::async_trait;
use starlight_common::AppConfig;

use crate::error::Result;
use crate::guards::{GuardOutcome, NavigationGuard, login_redirect_target};
use crate::route::sentinel;
use crate::router::ResolvedRoute;
use crate::store::{AuthenticationStore, UserInfoStore};

pub struct AuthenticationGuard {
    config: Arc<AppConfig>,
    auth: Arc<AuthenticationStore>,
    user_info: Arc<UserInfoStore>,
}

impl AuthenticationGuard {
    pub fn new(
        config: Arc<AppConfig>,
        auth: Arc<AuthenticationStore>,
        user_info: Arc<UserInfoStore>,
    ) -> Self {
        Self {
            config,
            auth,
            user_info,
        }
    }

    fn is_exempt(&self, to: &ResolvedRoute) -> bool {
        to.meta.ignore_authentication
            || to
                .name
                .as_ref()
                .is_some_and(|name| self.config.ignore_authentication_routes.contains(name))
    }
}

#[async_trait]
impl NavigationGuard for AuthenticationGuard {
    fn name(&self) -> &'static str {
        "authentication"
    }

    async fn before(&self, to: &ResolvedRoute, _from: &ResolvedRoute) -> Result<GuardOutcome> {
        let logged_in = self.auth.is_logged_in();
        if logged_in && to.path == sentinel::LOGIN_PATH {
            return Ok(GuardOutcome::Redirect(sentinel::HOME_PATH.to_string()));
        }

        // Exempt routes pass through before any session work, so a
        // logged-in visit never triggers a profile fetch on them
        if self.is_exempt(to) {
            return Ok(GuardOutcome::Allow);
        }

        if logged_in {
            // A failed profile fetch fails the navigation with it
            if !self.user_info.is_fetched() {
                self.user_info.fetch_user_info().await?;
            }
            return Ok(GuardOutcome::Allow);
        }

        if self.config.anonymous_enable {
            self.auth.ensure_anonymous_identity()?;
            return Ok(GuardOutcome::Allow);
        }

        Ok(GuardOutcome::Redirect(login_redirect_target(to)))
    }
}
