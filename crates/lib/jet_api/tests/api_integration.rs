//! Integration tests: full router over the in-memory store, driven with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use jet_api::bootstrap::build_app;
use jet_api::config::AppConfig;
use jet_core::clock::{Clock, ManualClock};
use jet_core::repo::{MemoryUserRepository, UserRepository};
use jet_core::seed::SeedUser;
use serde_json::{Value, json};
use tower::ServiceExt;

struct Harness {
    app: Router,
    store: Arc<MemoryUserRepository>,
    clock: Arc<ManualClock>,
}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.secret = "integration-secret".into();
    config.jwt.expire_hours = 1;
    config.app.mode = "test".into();
    config.seed.users = vec![SeedUser {
        username: "alice".into(),
        nick_name: "Alice".into(),
        email: "alice@example.com".into(),
        password: "wonderland".into(),
    }];
    config
}

async fn harness() -> Harness {
    let store = Arc::new(MemoryUserRepository::new());
    let clock = Arc::new(ManualClock::starting_now());
    let app = build_app(config(), store.clone(), Some(clock.clone() as Arc<dyn Clock>))
        .await
        .expect("build app");
    Harness { app, store, clock }
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).expect("parse JSON");
    (status, json)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn alice_token(app: &Router) -> String {
    let (status, body) = login(app, "alice", "wonderland").await;
    assert_eq!(StatusCode::OK, status, "{body}");
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn allow_listed_paths_need_no_token() {
    let h = harness().await;

    let (status, body) = call(&h.app, Method::GET, "/health", None, None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(200, body["code"]);
    assert_eq!("healthy", body["data"]["status"]);
    assert_eq!("healthy", body["data"]["database"]["status"]);

    let (status, body) = login(&h.app, "alice", "wonderland").await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("Bearer", body["data"]["token_type"]);
    assert_eq!(3600, body["data"]["expires_in"]);
    assert_eq!("alice", body["data"]["username"]);
}

#[tokio::test]
async fn protected_path_without_header_is_token_missing() {
    let h = harness().await;
    let (status, body) = call(&h.app, Method::GET, "/api/v1/users", None, None).await;
    assert_eq!(StatusCode::FORBIDDEN, status);
    assert_eq!(403, body["code"]);
    assert_eq!("Token missing", body["message"]);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn garbage_token_is_invalid() {
    let h = harness().await;
    let (status, body) = call(&h.app, Method::GET, "/api/v1/users", Some("garbage"), None).await;
    assert_eq!(StatusCode::FORBIDDEN, status);
    assert_eq!("Invalid token", body["message"]);
}

#[tokio::test]
async fn token_without_bearer_prefix_is_accepted() {
    let h = harness().await;
    let token = alice_token(&h.app).await;
    let req = Request::builder()
        .uri("/api/v1/profile")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(StatusCode::OK, resp.status());
}

#[tokio::test]
async fn profile_reflects_token_until_it_expires() {
    let h = harness().await;
    let token = alice_token(&h.app).await;
    let alice = h.store.find_by_username("alice").await.unwrap().unwrap();

    let (status, body) = call(&h.app, Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(alice.id, body["data"]["id"]);
    assert_eq!("alice", body["data"]["username"]);

    // Exactly at expiry the token still verifies.
    h.clock.advance(3600);
    let (status, _) = call(&h.app, Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(StatusCode::OK, status);

    h.clock.advance(1);
    let (status, body) = call(&h.app, Method::GET, "/api/v1/profile", Some(&token), None).await;
    assert_eq!(StatusCode::FORBIDDEN, status);
    assert_eq!("Token expired", body["message"]);
}

#[tokio::test]
async fn login_failures_map_to_401_and_404() {
    let h = harness().await;

    let (status, body) = login(&h.app, "alice", "Wonderland").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status);
    assert_eq!("Authentication failed", body["message"]);

    let (status, body) = login(&h.app, "mallory", "wonderland").await;
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!("User not found", body["message"]);

    let (status, _) = call(
        &h.app,
        Method::POST,
        "/api/v1/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
}

#[tokio::test]
async fn register_then_login() {
    let h = harness().await;
    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/v1/register",
        None,
        Some(json!({
            "username": "bob",
            "nick_name": "Bob",
            "password": "builder",
            "email": "bob@example.com",
        })),
    )
    .await;
    assert_eq!(StatusCode::OK, status, "{body}");
    assert_eq!("bob", body["data"]["created_by"]);
    assert!(body["data"].get("password_hash").is_none());

    let (status, _) = login(&h.app, "bob", "builder").await;
    assert_eq!(StatusCode::OK, status);
}

#[tokio::test]
async fn user_crud_round() {
    let h = harness().await;
    let token = alice_token(&h.app).await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/v1/users",
        Some(&token),
        Some(json!({
            "username": "carol",
            "nick_name": "Carol",
            "password": "secret-carol",
            "email": "carol@example.com",
        })),
    )
    .await;
    assert_eq!(StatusCode::OK, status, "{body}");
    assert_eq!("alice", body["data"]["created_by"]);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = call(&h.app, Method::GET, "/api/v1/users", Some(&token), None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(2, body["data"].as_array().unwrap().len());

    let uri = format!("/api/v1/users/{id}");
    let (status, body) = call(
        &h.app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "nick_name": "Caz" })),
    )
    .await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("Caz", body["data"]["nick_name"]);
    assert_eq!("alice", body["data"]["updated_by"]);

    let (status, _) = call(&h.app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(StatusCode::OK, status);

    let (status, body) = call(&h.app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!("User not found", body["message"]);

    let (status, body) = call(&h.app, Method::GET, "/api/v1/users/abc", Some(&token), None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert_eq!("Invalid user ID", body["message"]);
}

#[tokio::test]
async fn seeding_does_not_duplicate() {
    let store = Arc::new(MemoryUserRepository::new());
    build_app(config(), store.clone(), None).await.unwrap();
    let app = build_app(config(), store.clone(), None).await.unwrap();
    assert_eq!(1, store.count().await.unwrap());

    let token = alice_token(&app).await;
    let (status, body) = call(&app, Method::POST, "/api/v1/users/insert", Some(&token), None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(true, body["data"]["skipped"]);
    assert_eq!(1, store.count().await.unwrap());
}

#[tokio::test]
async fn seeding_can_be_disabled() {
    let store = Arc::new(MemoryUserRepository::new());
    let mut config = config();
    config.seed.enabled = false;
    build_app(config, store.clone(), None).await.unwrap();
    assert_eq!(0, store.count().await.unwrap());
}

#[tokio::test]
async fn health_reports_unavailable_store() {
    let h = harness().await;
    h.store.set_offline(true);
    let (status, body) = call(&h.app, Method::GET, "/health", None, None).await;
    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status);
    assert_eq!(503, body["code"]);
    assert_eq!("Service unavailable", body["message"]);
}

#[tokio::test]
async fn unmatched_allow_listed_path_gets_envelope_404() {
    let h = harness().await;
    let (status, body) = call(&h.app, Method::GET, "/nope/login", None, None).await;
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!(404, body["code"]);
    assert_eq!("Resource not found", body["message"]);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn unmatched_path_with_token_gets_envelope_404() {
    let h = harness().await;
    let token = alice_token(&h.app).await;
    let (status, body) = call(&h.app, Method::GET, "/api/v1/nothing-here", Some(&token), None).await;
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!(404, body["code"]);
}

#[tokio::test]
async fn non_utf8_authorization_header_is_invalid() {
    let h = harness().await;
    let req = Request::builder()
        .uri("/api/v1/users")
        .header(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xFF").unwrap(),
        )
        .body(Body::empty())
        .unwrap();
    let resp = h.app.clone().oneshot(req).await.unwrap();
    assert_eq!(StatusCode::FORBIDDEN, resp.status());
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(403, body["code"]);
    assert_eq!("Invalid token", body["message"]);
}

#[tokio::test]
async fn seeding_against_offline_store_is_503() {
    let h = harness().await;
    let token = alice_token(&h.app).await;
    h.store.set_offline(true);
    let (status, body) = call(&h.app, Method::POST, "/api/v1/users/insert", Some(&token), None).await;
    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status);
    assert_eq!("Service unavailable", body["message"]);
}
