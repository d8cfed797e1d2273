//! Request executor
//!
//! Resolves a descriptor plus per-call values into one HTTP request:
//! path substitution, fixed/dynamic merging, verb dispatch, bearer
//! injection, and the response-side classification pipeline. A newer
//! identical request cancels the one still in flight; the cancelled
//! call rejects silently.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use starlight_common::config::ResultCodes;
use starlight_common::{AppConfig, Notifier, SessionTokens};
use tokio::sync::Notify;
use tracing::debug;

use crate::descriptor::{ApiDescriptor, ApiRegistry};
use crate::error::{ApiError, Result};
use crate::interceptor::{
    ApiEventHandler, classify, notify_envelope_failure, notify_transport_error,
};
use crate::model::{ApiResponse, RequestMethod, to_query_string};
use crate::request::{ApiRequest, MergedRequest, merge_request};

/// Wire form of the backend envelope; `data` defaults to null when
/// the backend leaves it out of a failure response
#[derive(serde::Deserialize)]
struct RawEnvelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// HTTP client executing descriptor-driven API calls
pub struct ApiClient {
    client: Client,
    base_url: String,
    codes: ResultCodes,
    show_rapid_duplicate_warning: bool,
    tokens: Arc<SessionTokens>,
    notifier: Arc<dyn Notifier>,
    registry: Arc<ApiRegistry>,
    events: RwLock<Option<Arc<dyn ApiEventHandler>>>,
    in_flight: DashMap<String, Arc<Notify>>,
}

impl ApiClient {
    pub fn new(
        config: &AppConfig,
        tokens: Arc<SessionTokens>,
        notifier: Arc<dyn Notifier>,
        registry: Arc<ApiRegistry>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ApiError::from_transport)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            codes: config.result_codes.clone(),
            show_rapid_duplicate_warning: config.show_rapid_duplicate_request_warning,
            tokens,
            notifier,
            registry,
            events: RwLock::new(None),
            in_flight: DashMap::new(),
        })
    }

    /// Install the envelope failure handler (session coordinator).
    ///
    /// Installed after construction because the handler itself needs
    /// the client to perform its own calls.
    pub fn set_event_handler(&self, handler: Arc<dyn ApiEventHandler>) {
        *self.events.write() = Some(handler);
    }

    /// Execute an operation looked up by `module.operation` key
    pub async fn execute_op<T: DeserializeOwned>(
        &self,
        namespace: &str,
        request: Option<&ApiRequest>,
    ) -> Result<ApiResponse<T>> {
        let descriptor = self.registry.lookup(namespace)?;
        self.execute(&descriptor, request).await
    }

    /// Execute a descriptor with the given per-call values
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: &ApiDescriptor,
        request: Option<&ApiRequest>,
    ) -> Result<ApiResponse<T>> {
        let merged = merge_request(descriptor, request);
        let url = self.build_url(&merged);

        debug!("executing {} {}", merged.method, url);

        let response = match self.dispatch(&merged, &url).await {
            Ok(response) => response,
            Err(e) => {
                notify_transport_error(
                    self.notifier.as_ref(),
                    &e,
                    self.show_rapid_duplicate_warning,
                );
                return Err(e);
            }
        };

        self.handle_response(response, merged.method, &merged.uri)
            .await
    }

    fn build_url(&self, merged: &MergedRequest) -> String {
        let query = to_query_string(&merged.params);
        if query.is_empty() {
            format!("{}{}", self.base_url, merged.uri)
        } else {
            format!("{}{}?{}", self.base_url, merged.uri, query)
        }
    }

    /// Send the request, cancelling any identical one still in flight
    async fn dispatch(&self, merged: &MergedRequest, url: &str) -> Result<reqwest::Response> {
        let method = match merged.method {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");
        for (key, value) in &merged.headers {
            builder = builder.header(key, value);
        }
        if let Some(token) = self.tokens.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(data) = &merged.data {
            builder = builder.json(data);
        }

        let key = format!("{} {}", merged.method, url);
        let cancel = Arc::new(Notify::new());
        if let Some(previous) = self.in_flight.insert(key.clone(), cancel.clone()) {
            previous.notify_waiters();
        }

        let result = tokio::select! {
            outcome = builder.send() => outcome.map_err(ApiError::from_transport),
            _ = cancel.notified() => Err(ApiError::Cancelled),
        };

        self.in_flight
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &cancel));

        result
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        method: RequestMethod,
        uri: &str,
    ) -> Result<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from_transport)?;

        // Transport-level success with no body is still a failure
        if text.trim().is_empty() {
            let code = status.as_u16() as i64;
            let message = status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string();
            self.dispatch_envelope_failure(code, &message, method, uri)
                .await;
            return Err(ApiError::Envelope { code, message });
        }

        // Failure envelopes may omit `data` entirely, so the raw
        // decode tolerates its absence and classification goes by code
        match serde_json::from_str::<RawEnvelope>(&text) {
            Ok(envelope) if envelope.code == self.codes.success => {
                let data = serde_json::from_value::<T>(envelope.data).map_err(|e| {
                    let err = ApiError::Decode(e.to_string());
                    notify_transport_error(
                        self.notifier.as_ref(),
                        &err,
                        self.show_rapid_duplicate_warning,
                    );
                    err
                })?;
                Ok(ApiResponse {
                    code: envelope.code,
                    message: envelope.message,
                    data,
                })
            }
            Ok(envelope) => {
                self.dispatch_envelope_failure(envelope.code, &envelope.message, method, uri)
                    .await;
                Err(ApiError::Envelope {
                    code: envelope.code,
                    message: envelope.message,
                })
            }
            Err(_) if !status.is_success() => {
                let err = ApiError::Status(status.as_u16());
                notify_transport_error(
                    self.notifier.as_ref(),
                    &err,
                    self.show_rapid_duplicate_warning,
                );
                Err(err)
            }
            Err(e) => {
                let err = ApiError::Decode(e.to_string());
                notify_transport_error(
                    self.notifier.as_ref(),
                    &err,
                    self.show_rapid_duplicate_warning,
                );
                Err(err)
            }
        }
    }

    async fn dispatch_envelope_failure(
        &self,
        code: i64,
        message: &str,
        method: RequestMethod,
        uri: &str,
    ) {
        let kind = classify(code, &self.codes);
        let handler = self.events.read().clone();
        match handler {
            Some(handler) => {
                handler
                    .on_envelope_failure(kind, code, message, method, uri)
                    .await;
            }
            None => {
                notify_envelope_failure(self.notifier.as_ref(), kind, message, method, uri);
            }
        }
    }
}
