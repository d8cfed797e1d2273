//! Current-user profile store

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use starlight_api::{ApiClient, FrameworkOps};
use starlight_common::SessionTokens;
use starlight_messaging::MessagingClient;

use crate::error::Result;

/// Profile of the logged-in user
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub function_permissions: Vec<String>,
}

pub struct UserInfoStore {
    api: Arc<ApiClient>,
    ops: FrameworkOps,
    messaging: Arc<MessagingClient>,
    tokens: Arc<SessionTokens>,
    info: RwLock<Option<UserInfo>>,
}

impl UserInfoStore {
    pub fn new(
        api: Arc<ApiClient>,
        ops: FrameworkOps,
        messaging: Arc<MessagingClient>,
        tokens: Arc<SessionTokens>,
    ) -> Self {
        Self {
            api,
            ops,
            messaging,
            tokens,
            info: RwLock::new(None),
        }
    }

    pub fn is_fetched(&self) -> bool {
        self.info.read().is_some()
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        self.info.read().clone()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.info
            .read()
            .as_ref()
            .is_some_and(|info| info.function_permissions.iter().any(|p| p == permission))
    }

    /// Fetch the profile and bring the messaging connection up with it
    pub async fn fetch_user_info(&self) -> Result<UserInfo> {
        let response = self
            .api
            .execute_op::<UserInfo>(&self.ops.fetch_user_info, None)
            .await?;
        let info = response.data;

        *self.info.write() = Some(info.clone());
        self.messaging
            .set_local_user(info.id.map(|id| id.to_string()));
        if let Some(token) = self.tokens.access_token() {
            self.messaging.connect(&token);
        }
        Ok(info)
    }

    pub fn clear(&self) {
        *self.info.write() = None;
        self.messaging.set_local_user(None);
    }
}
