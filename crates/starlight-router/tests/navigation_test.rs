//! Full navigation pipeline against a mock API backend

use std::sync::Arc;

use serde_json::json;
use starlight_api::ApiDescriptor;
use starlight_common::{AppConfig, RecordingNotifier};
use starlight_common::notify::NotifyLevel;
use starlight_router::{ConsoleApp, NavigationOutcome, RouteRecord};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({"code": 200, "message": "", "data": data})
}

async fn mock_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/user/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": 7,
            "name": "ale",
            "functionPermissions": ["system:menu:list"]
        }))))
        .mount(server)
        .await;
}

async fn mock_menus(server: &MockServer, expect: u64) {
    Mock::given(method("GET"))
        .and(path("/user/menus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            {
                "id": 1,
                "name": "Dashboard",
                "componentName": "dashboard",
                "uri": "/dashboard",
                "topLevel": true,
                "keepAlive": true
            },
            {
                "id": 2,
                "name": "Reports",
                "componentName": "reports",
                "uri": "/reports",
                "topLevel": true,
                "keepAlive": false
            }
        ]))))
        .expect(expect)
        .mount(server)
        .await;
}

fn app_for(server: &MockServer, notifier: Arc<RecordingNotifier>) -> Arc<ConsoleApp> {
    let app = ConsoleApp::new(AppConfig::new(&server.uri()), notifier).unwrap();
    app.views.register_all(["/dashboard", "/reports"]);
    app
}

#[tokio::test]
async fn unauthenticated_navigation_lands_on_login_with_redirect() {
    let server = MockServer::start().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let app = app_for(&server, notifier.clone());

    // A registered target survives the interruption in the query
    let _docs = app
        .router
        .table()
        .add_route(&RouteRecord::new("/public/docs").with_name("docs"));
    let outcome = app.router.push("/public/docs?page=2").await;
    assert!(matches!(outcome, NavigationOutcome::Done(_)));

    let current = app.router.current_route();
    assert_eq!(current.path, "/login");
    assert_eq!(
        current.query.get("redirect").map(String::as_str),
        Some("/public/docs?page=2")
    );
    assert!(notifier.records().is_empty());
}

#[tokio::test]
async fn unregistered_target_lands_on_login_without_redirect() {
    let server = MockServer::start().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let app = app_for(&server, notifier.clone());

    // Before login no dynamic routes exist, so the target resolves
    // into the not-found fallback and is dropped from the query
    let outcome = app.router.push("/system/menu?tab=2").await;
    assert!(matches!(outcome, NavigationOutcome::Done(_)));

    let current = app.router.current_route();
    assert_eq!(current.path, "/login");
    assert!(current.query.get("redirect").is_none());
    assert!(notifier.records().is_empty());
}

#[tokio::test]
async fn exempt_route_skips_profile_fetch_for_logged_in_user() {
    // No /user/info mock mounted: any profile fetch would error out
    // and cancel the navigation
    let server = MockServer::start().await;
    let app = app_for(&server, Arc::new(RecordingNotifier::new()));
    app.auth.set_access_token("token-1").unwrap();

    let outcome = app.router.push("/ssoLogin").await;
    assert!(matches!(outcome, NavigationOutcome::Done(_)));
    assert_eq!(app.router.current_route().path, "/ssoLogin");
    assert!(!app.user_info.is_fetched());
}

#[tokio::test]
async fn first_navigation_loads_menus_exactly_once() {
    let server = MockServer::start().await;
    mock_profile(&server).await;
    mock_menus(&server, 1).await;

    let notifier = Arc::new(RecordingNotifier::new());
    let app = app_for(&server, notifier.clone());
    app.auth.set_access_token("token-1").unwrap();

    // Unknown path falls into not-found, the guard loads the menu
    // tree and retries the original target
    let outcome = app.router.push("/dashboard").await;
    assert!(matches!(outcome, NavigationOutcome::Done(_)));
    let current = app.router.current_route();
    assert_eq!(current.path, "/dashboard");
    assert_eq!(current.name.as_deref(), Some("dashboard"));

    // Logged-in user on the login page bounces home, which now
    // redirects to the first dynamic route; no second menu fetch
    app.router.push("/login").await;
    assert_eq!(app.router.current_route().path, "/dashboard");
    assert!(app.user_info.has_permission("system:menu:list"));
}

#[tokio::test]
async fn keep_alive_cache_tracks_route_flags_idempotently() {
    let server = MockServer::start().await;
    mock_profile(&server).await;
    mock_menus(&server, 1).await;

    let app = app_for(&server, Arc::new(RecordingNotifier::new()));
    app.auth.set_access_token("token-1").unwrap();

    app.router.push("/dashboard").await;
    assert_eq!(app.routes.cached_routes(), vec!["dashboard".to_string()]);

    // Re-entering the same route does not duplicate the entry
    app.router.push("/reports").await;
    app.router.push("/dashboard").await;
    assert_eq!(app.routes.cached_routes(), vec!["dashboard".to_string()]);
    assert_eq!(app.routes.active_route().as_deref(), Some("/dashboard"));
}

#[tokio::test]
async fn logout_restores_static_only_route_table() {
    let server = MockServer::start().await;
    mock_profile(&server).await;
    mock_menus(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!(null))))
        .mount(&server)
        .await;

    let app = app_for(&server, Arc::new(RecordingNotifier::new()));
    app.auth.set_access_token("token-1").unwrap();

    app.router.push("/dashboard").await;
    assert!(app.router.resolve("/dashboard").matched);
    assert!(app.routes.is_fetched());

    app.auth.logout().await.unwrap();

    assert!(!app.auth.is_logged_in());
    assert!(!app.routes.is_fetched());
    assert!(!app.router.resolve("/dashboard").matched);
    assert!(app.routes.cached_routes().is_empty());
    // Static routes survive the teardown
    assert!(app.router.resolve("/login").matched);
}

#[tokio::test]
async fn classified_session_failure_forces_one_login_navigation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 403, "message": "no session", "data": null
        })))
        .mount(&server)
        .await;

    let notifier = Arc::new(RecordingNotifier::new());
    let app = app_for(&server, notifier.clone());
    app.auth.set_access_token("stale").unwrap();

    let result = app
        .api
        .execute::<serde_json::Value>(&ApiDescriptor::get("/private/report"), None)
        .await;
    assert!(result.is_err());

    // One warning, one forced navigation, session gone
    assert_eq!(notifier.count_at(NotifyLevel::Warning), 1);
    assert!(!app.auth.is_logged_in());
    let current = app.router.current_route();
    assert_eq!(current.path, "/login");
    assert_eq!(current.query.get("redirect").map(String::as_str), Some("/"));
}

#[tokio::test]
async fn anonymous_mode_synthesizes_one_persistent_identity() {
    let server = MockServer::start().await;
    let notifier = Arc::new(RecordingNotifier::new());
    let app = ConsoleApp::new(
        AppConfig::new(&server.uri()).with_anonymous(true),
        notifier,
    )
    .unwrap();

    app.router.push("/404").await;
    let first = app.tokens.anonymous_token().expect("identity synthesized");

    app.router.push("/403").await;
    assert_eq!(app.tokens.anonymous_token(), Some(first));
    assert!(!app.auth.is_logged_in());
}
