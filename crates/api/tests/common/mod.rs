//! Common test utilities for integration tests.
//!
//! Every test builds its own application over a fresh in-memory store, so
//! tests are independent and need no external services.

// Not every helper is used by every test binary
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use domain::services::{KeyValueStore, MemoryStore};
use eventease_api::{app::create_app, config::Config};
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Test configuration with the in-memory backend.
pub fn test_config() -> Config {
    Config::load_for_test(&[]).expect("Failed to load test config")
}

/// Create a test application over a fresh in-memory store.
pub fn create_test_app() -> Router {
    create_test_app_with_store(Arc::new(MemoryStore::new()))
}

pub fn create_test_app_with_store(store: Arc<dyn KeyValueStore>) -> Router {
    create_app(test_config(), store).expect("Failed to create app")
}

/// Generate a unique email for testing.
pub fn unique_test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Helper to create a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Helper to create a request without a body.
pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Sends one request and returns the status and parsed body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

/// Signs up an account and logs it in. Returns the session token.
pub async fn sign_in(app: &Router, email: &str, is_admin: bool) -> String {
    let name: String = Name().fake();
    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/auth/signup",
            json!({
                "name": name,
                "email": email,
                "password": "SecureP@ss123!",
                "confirmPassword": "SecureP@ss123!",
                "isAdmin": is_admin
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({ "email": email, "password": "SecureP@ss123!" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

pub async fn sign_in_admin(app: &Router) -> String {
    sign_in(app, &unique_test_email(), true).await
}

/// Submits a seat request for `event_id`.
pub async fn submit(app: &Router, event_id: &str, email: &str, seats: u32) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/events/{}/registrations", event_id),
            json!({ "fullname": "Ada Lovelace", "email": email, "seats": seats }),
            None,
        ),
    )
    .await
}

/// Posts an approve or reject decision as `token`.
pub async fn decide(
    app: &Router,
    token: &str,
    decision: &str,
    event_id: &str,
    email: &str,
) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/admin/registrations/{}", decision),
            json!({ "eventId": event_id, "email": email }),
            Some(token),
        ),
    )
    .await
}

pub async fn seats_of(app: &Router, event_id: &str) -> u64 {
    let (status, body) = send(
        app,
        empty_request(Method::GET, &format!("/api/v1/events/{}", event_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["numberOfSeats"].as_u64().unwrap()
}
