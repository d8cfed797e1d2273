//! Executor and interceptor behavior against a mock HTTP server

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use starlight_api::{
    ApiClient, ApiDescriptor, ApiError, ApiEventHandler, ApiRegistry, ApiRequest, FailureKind,
    RequestMethod,
};
use starlight_common::{AppConfig, RecordingNotifier, SessionTokens};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingHandler {
    calls: AtomicUsize,
    last: Mutex<Option<(FailureKind, i64, String)>>,
}

#[async_trait]
impl ApiEventHandler for RecordingHandler {
    async fn on_envelope_failure(
        &self,
        kind: FailureKind,
        code: i64,
        message: &str,
        _method: RequestMethod,
        _uri: &str,
    ) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some((kind, code, message.to_string()));
    }
}

fn make_client(
    server_url: &str,
    tokens: Arc<SessionTokens>,
    notifier: Arc<RecordingNotifier>,
) -> ApiClient {
    let config = AppConfig::new(server_url);
    ApiClient::new(&config, tokens, notifier, Arc::new(ApiRegistry::new())).unwrap()
}

#[tokio::test]
async fn success_envelope_resolves_with_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/7"))
        .and(query_param("scope", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "message": "ok",
            "data": {"id": "7", "name": "ale"}
        })))
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let client = make_client(&server.uri(), Arc::new(SessionTokens::new()), notifier.clone());

    let descriptor = ApiDescriptor::get("/user/{id}").with_fixed_param("scope", "admin");
    let request = ApiRequest::new().with_path_param("id", 7);
    let response = client
        .execute::<serde_json::Value>(&descriptor, Some(&request))
        .await
        .unwrap();

    assert_eq!(response.data["name"], "ale");
    assert!(notifier.records().is_empty());
}

#[tokio::test]
async fn bearer_token_attached_when_logged_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200, "message": "", "data": true
        })))
        .mount(&server)
        .await;

    let tokens = Arc::new(SessionTokens::new());
    tokens.set_access_token(Some("token-1".to_string()));
    let client = make_client(&server.uri(), tokens, Arc::new(RecordingNotifier::new()));

    let response = client
        .execute::<bool>(&ApiDescriptor::get("/ping"), None)
        .await
        .unwrap();
    assert!(response.data);
}

#[tokio::test]
async fn envelope_failure_classified_and_dispatched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1008, "message": "token expired", "data": null
        })))
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let client = make_client(&server.uri(), Arc::new(SessionTokens::new()), notifier.clone());
    let handler = Arc::new(RecordingHandler::default());
    client.set_event_handler(handler.clone());

    let err = client
        .execute::<serde_json::Value>(&ApiDescriptor::get("/user/info"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Envelope { code: 1008, .. }));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    let last = handler.last.lock().clone().unwrap();
    assert_eq!(last.0, FailureKind::TokenExpired);
    // The handler owns the side effects; the executor itself stays quiet
    assert!(notifier.records().is_empty());
}

#[tokio::test]
async fn failure_envelope_without_data_is_still_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1008, "message": "token expired"
        })))
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let client = make_client(&server.uri(), Arc::new(SessionTokens::new()), notifier.clone());
    let handler = Arc::new(RecordingHandler::default());
    client.set_event_handler(handler.clone());

    let err = client
        .execute::<serde_json::Value>(&ApiDescriptor::get("/session/check"), None)
        .await
        .unwrap_err();

    // Absent `data` must not derail the code-based classification
    assert!(matches!(err, ApiError::Envelope { code: 1008, .. }));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    assert_eq!(handler.last.lock().clone().unwrap().0, FailureKind::TokenExpired);
}

#[tokio::test]
async fn missing_body_becomes_status_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = make_client(
        &server.uri(),
        Arc::new(SessionTokens::new()),
        Arc::new(RecordingNotifier::new()),
    );

    let err = client
        .execute::<serde_json::Value>(&ApiDescriptor::get("/empty"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Envelope { code: 200, .. }));
}

#[tokio::test]
async fn status_error_without_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let client = make_client(&server.uri(), Arc::new(SessionTokens::new()), notifier.clone());

    let err = client
        .execute::<serde_json::Value>(&ApiDescriptor::get("/broken"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status(502)));

    let records = notifier.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].2.contains("502"));
}

#[tokio::test]
async fn timeout_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"code": 200, "message": "", "data": null})),
        )
        .mount(&server)
        .await;

    let config = AppConfig::new(&server.uri()).with_timeout(Duration::from_millis(200));
    let notifier = Arc::new(RecordingNotifier::new());
    let client = ApiClient::new(
        &config,
        Arc::new(SessionTokens::new()),
        notifier.clone(),
        Arc::new(ApiRegistry::new()),
    )
    .unwrap();

    let err = client
        .execute::<serde_json::Value>(&ApiDescriptor::get("/slow"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout));

    let records = notifier.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].2.contains("timed out"));
}

#[tokio::test]
async fn rapid_duplicate_request_is_cancelled_silently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({"code": 200, "message": "", "data": 1})),
        )
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let client = Arc::new(make_client(
        &server.uri(),
        Arc::new(SessionTokens::new()),
        notifier.clone(),
    ));

    let first = {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .execute::<i64>(&ApiDescriptor::get("/report"), None)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = client
        .execute::<i64>(&ApiDescriptor::get("/report"), None)
        .await;
    assert_eq!(second.unwrap().data, 1);

    let first = first.await.unwrap();
    assert!(matches!(first.unwrap_err(), ApiError::Cancelled));
    // Cancellation never reaches the user
    assert!(notifier.records().is_empty());
}
