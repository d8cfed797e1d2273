//! Application configuration
//!
//! Mirrors the deployment-supplied settings of the console: API base
//! address, request timeout, messaging server address, result-code
//! table, and the authentication exemption lists. Every field can be
//! overridden through `STARLIGHT_*` environment variables.

use std::time::Duration;

use crate::error::{CommonError, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "STARLIGHT_";

/// Result codes recognized in the API response envelope.
///
/// These are deployment configuration, not protocol constants; only
/// the 503 service-unavailable sentinel is fixed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultCodes {
    /// Code signalling a successful call
    pub success: i64,
    /// Code signalling a missing or invalid session
    pub unauthorized: i64,
    /// Code signalling an authenticated but forbidden call
    pub access_denied: i64,
    /// Code signalling a lapsed session
    pub token_expired: i64,
}

impl Default for ResultCodes {
    fn default() -> Self {
        Self {
            success: 200,
            unauthorized: 403,
            access_denied: 405,
            token_expired: 1008,
        }
    }
}

/// Fixed sentinel code for an unavailable backend service
pub const SERVICE_UNAVAILABLE_CODE: i64 = 503;

/// Configuration for the console client
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Application title
    pub title: String,
    /// Base URL for API requests
    pub api_base_url: String,
    /// Realtime messaging server URL (ws:// or wss://)
    pub instant_message_server_url: String,
    /// Request timeout
    pub request_timeout: Duration,
    /// Result codes recognized in response envelopes
    pub result_codes: ResultCodes,
    /// Warn when a request is cancelled by a rapid duplicate
    pub show_rapid_duplicate_request_warning: bool,
    /// Whether anonymous access is enabled globally
    pub anonymous_enable: bool,
    /// Route names that never require authentication
    pub ignore_authentication_routes: Vec<String>,
    /// Route names that never trigger the menu fetch
    pub ignore_fetch_menus_route_names: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "starlight".to_string(),
            api_base_url: "http://127.0.0.1:8080".to_string(),
            instant_message_server_url: "ws://127.0.0.1:8090/im".to_string(),
            request_timeout: Duration::from_secs(10),
            result_codes: ResultCodes::default(),
            show_rapid_duplicate_request_warning: false,
            anonymous_enable: false,
            ignore_authentication_routes: vec![
                "login".to_string(),
                "redirect".to_string(),
                "ssoLogin".to_string(),
            ],
            ignore_fetch_menus_route_names: vec!["ssoLogin".to_string()],
        }
    }
}

impl AppConfig {
    /// Create a config with the given API base URL
    pub fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
            ..Default::default()
        }
    }

    /// Set the messaging server URL
    pub fn with_message_server(mut self, url: &str) -> Self {
        self.instant_message_server_url = url.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the envelope result codes
    pub fn with_result_codes(mut self, codes: ResultCodes) -> Self {
        self.result_codes = codes;
        self
    }

    /// Enable or disable anonymous access
    pub fn with_anonymous(mut self, enabled: bool) -> Self {
        self.anonymous_enable = enabled;
        self
    }

    /// Load the default config and apply `STARLIGHT_*` environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(title) = std::env::var(format!("{ENV_PREFIX}TITLE")) {
            config.title = title;
        }
        if let Ok(url) = std::env::var(format!("{ENV_PREFIX}API_BASE_URL")) {
            config.api_base_url = url;
        }
        if let Ok(url) = std::env::var(format!("{ENV_PREFIX}INSTANT_MESSAGE_SERVER_URL")) {
            config.instant_message_server_url = url;
        }
        if let Ok(value) = std::env::var(format!("{ENV_PREFIX}REQUEST_TIMEOUT_MS")) {
            let millis = value.parse::<u64>().map_err(|_| CommonError::InvalidConfig {
                key: format!("{ENV_PREFIX}REQUEST_TIMEOUT_MS"),
                value: value.clone(),
            })?;
            config.request_timeout = Duration::from_millis(millis);
        }
        if let Ok(value) = std::env::var(format!("{ENV_PREFIX}ANONYMOUS_ENABLE")) {
            config.anonymous_enable = parse_bool(&value, "ANONYMOUS_ENABLE")?;
        }
        if let Ok(value) = std::env::var(format!("{ENV_PREFIX}SHOW_RAPID_DUPLICATE_REQUEST_WARNING"))
        {
            config.show_rapid_duplicate_request_warning =
                parse_bool(&value, "SHOW_RAPID_DUPLICATE_REQUEST_WARNING")?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str, key: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(CommonError::InvalidConfig {
            key: format!("{ENV_PREFIX}{key}"),
            value: value.to_string(),
        }),
    }
}
