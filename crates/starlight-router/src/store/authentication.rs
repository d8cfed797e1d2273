//! Authentication store
//!
//! Owns the persisted session tokens and the logout cascade. Tokens
//! live in a prefixed storage scope and are mirrored into the shared
//! `SessionTokens` handle the API and messaging layers read from.

use std::sync::Arc;

use serde_json::json;
use starlight_api::{ApiClient, ApiRequest, FrameworkOps};
use starlight_common::{ScopedStorage, SessionTokens, StorageBackend};
use starlight_messaging::MessagingClient;
use tracing::{info, warn};

use crate::error::Result;
use crate::store::{DynamicRouteStore, UserInfoStore};

/// Storage scope holding the session tokens
pub const AUTHENTICATION_PREFIX: &str = "AUTHENTICATION_";

const ACCESS_TOKEN_KEY: &str = "access_token";
const ANONYMOUS_TOKEN_KEY: &str = "anonymous_token";

pub struct AuthenticationStore {
    storage: ScopedStorage,
    tokens: Arc<SessionTokens>,
    api: Arc<ApiClient>,
    ops: FrameworkOps,
    user_info: Arc<UserInfoStore>,
    routes: Arc<DynamicRouteStore>,
    messaging: Arc<MessagingClient>,
}

impl AuthenticationStore {
    pub fn new(
        backend: StorageBackend,
        tokens: Arc<SessionTokens>,
        api: Arc<ApiClient>,
        ops: FrameworkOps,
        user_info: Arc<UserInfoStore>,
        routes: Arc<DynamicRouteStore>,
        messaging: Arc<MessagingClient>,
    ) -> Self {
        let storage = ScopedStorage::new(AUTHENTICATION_PREFIX, backend);

        // Pick persisted tokens back up from a previous run
        if let Some(token) = storage.get::<String>(ACCESS_TOKEN_KEY) {
            tokens.set_access_token(Some(token));
        }
        if let Some(token) = storage.get::<String>(ANONYMOUS_TOKEN_KEY) {
            tokens.set_anonymous_token(Some(token));
        }

        Self {
            storage,
            tokens,
            api,
            ops,
            user_info,
            routes,
            messaging,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.is_logged_in()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.access_token()
    }

    /// Exchange credentials for an access token
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let request = ApiRequest::new()
            .with_data("username", json!(username))
            .with_data("password", json!(password));
        let response = self
            .api
            .execute_op::<String>(&self.ops.login, Some(&request))
            .await?;

        self.set_access_token(&response.data)?;
        info!("logged in as {}", username);
        Ok(())
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &token, None)?;
        self.tokens.set_access_token(Some(token.to_string()));
        Ok(())
    }

    /// Synthesize a persistent anonymous identity when no token exists
    pub fn ensure_anonymous_identity(&self) -> Result<()> {
        if self.tokens.active_token().is_some() {
            return Ok(());
        }
        if let Some(existing) = self.storage.get::<String>(ANONYMOUS_TOKEN_KEY) {
            self.tokens.set_anonymous_token(Some(existing));
            return Ok(());
        }

        let token = uuid::Uuid::new_v4().to_string();
        self.storage.set(ANONYMOUS_TOKEN_KEY, &token, None)?;
        self.tokens.set_anonymous_token(Some(token));
        Ok(())
    }

    /// End the session server-side, then clear local state either way
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self
            .api
            .execute_op::<serde_json::Value>(&self.ops.logout, None)
            .await
        {
            warn!("logout call failed, clearing local session anyway: {}", e);
        }
        self.clear_authentication();
        Ok(())
    }

    /// Drop every trace of the session: tokens, profile, dynamic
    /// routes and the messaging connection
    pub fn clear_authentication(&self) {
        self.storage.clear();
        self.tokens.clear();
        self.user_info.clear();
        self.routes.reset();
        self.messaging.disconnect();
    }
}
