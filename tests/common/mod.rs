// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use contabil_api::config::Config;
use contabil_api::db::Db;
use contabil_api::models::{Offering, Role, User};
use contabil_api::routes::create_router;
use contabil_api::services::password::hash_password;
use contabil_api::time_utils::now_rfc3339;
use contabil_api::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Password that satisfies the registration rules.
#[allow(dead_code)]
pub const PASSWORD: &str = "Secret123";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore-backed database on the emulator.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    Db::connect_firestore("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app on the in-memory backend.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, Db::in_memory()));
    (create_router(state.clone()), state)
}

/// Build a request with an optional JSON body and bearer token.
#[allow(dead_code)]
pub fn request(
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON response body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// Store a user directly, bypassing registration.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, email: &str, role: Role, active: bool) -> User {
    let now = now_rfc3339();
    let password_digest = hash_password(PASSWORD, &state.config.password_salt);
    state
        .db
        .insert(|id| User {
            id,
            name: "Test User".to_string(),
            email: email.to_string(),
            password_digest,
            role,
            active,
            created_at: now.clone(),
            updated_at: now,
        })
        .await
        .unwrap()
}

/// Seed a user and log in, returning the access token.
#[allow(dead_code)]
pub async fn login_as(app: &Router, state: &AppState, email: &str, role: Role) -> String {
    seed_user(state, email, role, true).await;
    let (status, _, body) = send(
        app,
        request(
            Method::POST,
            "/api/v1/auth/login",
            Some(serde_json::json!({ "email": email, "senha": PASSWORD })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Store an offering directly.
#[allow(dead_code)]
pub async fn seed_offering(state: &AppState, name: &str, active: bool) -> Offering {
    let now = now_rfc3339();
    state
        .db
        .insert(|id| Offering {
            id,
            name: name.to_string(),
            description: Some(format!("{name} para pequenas empresas")),
            price: Some(199.9),
            active,
            created_at: now.clone(),
            updated_at: now,
        })
        .await
        .unwrap()
}
