//! Session token holder
//!
//! One instance is shared between the authentication store, the API
//! client (request-side bearer injection) and the messaging client.
//! At most one of the two tokens is "active" for authorization; the
//! access token always takes precedence over the anonymous one.

use parking_lot::RwLock;

/// Shared authentication state
#[derive(Default)]
pub struct SessionTokens {
    access: RwLock<Option<String>>,
    anonymous: RwLock<Option<String>>,
}

impl SessionTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current access token, if logged in
    pub fn access_token(&self) -> Option<String> {
        self.access.read().clone()
    }

    /// Current anonymous token, if one was synthesized
    pub fn anonymous_token(&self) -> Option<String> {
        self.anonymous.read().clone()
    }

    /// Token used for authorization: access first, anonymous second
    pub fn active_token(&self) -> Option<String> {
        self.access_token().or_else(|| self.anonymous_token())
    }

    pub fn is_logged_in(&self) -> bool {
        self.access.read().is_some()
    }

    pub fn set_access_token(&self, token: Option<String>) {
        *self.access.write() = token;
    }

    pub fn set_anonymous_token(&self, token: Option<String>) {
        *self.anonymous.write() = token;
    }

    /// Drop both tokens
    pub fn clear(&self) {
        *self.access.write() = None;
        *self.anonymous.write() = None;
    }
}
