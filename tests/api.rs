// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end flows through the full router.

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use tokengate::api::router;
use tokengate::auth::{KeyPair, TokenManager};
use tokengate::config::JwtConfig;
use tokengate::state::AppState;

const PRIMARY_PRIVATE: &str = include_str!("fixtures/keys/primary_private.pem");
const PRIMARY_PUBLIC: &str = include_str!("fixtures/keys/primary_public.pem");
const ROTATED_PRIVATE: &str = include_str!("fixtures/keys/rotated_private.pem");
const ROTATED_PUBLIC: &str = include_str!("fixtures/keys/rotated_public.pem");

fn config() -> JwtConfig {
    JwtConfig {
        issuer: "tokengate-it".to_string(),
        private_key: PRIMARY_PRIVATE.to_string(),
        public_key: PRIMARY_PUBLIC.to_string(),
        access_token_validity_ms: 5 * 60 * 1000,
        refresh_token_validity_ms: 60 * 60 * 1000,
    }
}

fn state() -> AppState {
    AppState::from_config(&config()).expect("fixture keys load")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn generate(state: &AppState, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("PATCH")
        .uri("/p/example/jwt-generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router(state.clone()), request).await
}

async fn call_with_token(
    state: &AppState,
    method: &str,
    uri: &str,
    token: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(router(state.clone()), request).await
}

#[tokio::test]
async fn issued_token_authenticates_requests() {
    let state = state();
    let (status, body) = generate(&state, json!({ "username": "dev@example.com" })).await;
    assert_eq!(status, StatusCode::OK);

    let access = body["jwtToken"]["accessToken"].as_str().unwrap().to_string();
    let refresh = body["jwtToken"]["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = call_with_token(&state, "GET", "/example/whoami", &access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "dev@example.com");

    // Refresh tokens carry the same subject and are accepted the same way
    let (status, _) = call_with_token(&state, "GET", "/example/whoami", &refresh).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_route_honours_requested_authorities() {
    let state = state();

    let (_, body) = generate(&state, json!({ "username": "user@example.com" })).await;
    let user_token = body["jwtToken"]["accessToken"].as_str().unwrap().to_string();
    let (status, body) = call_with_token(&state, "PATCH", "/example/jwt-auth", &user_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorMessage"], "Access Denied");

    let (_, body) = generate(
        &state,
        json!({ "username": "admin@example.com", "authorities": ["ADMIN"] }),
    )
    .await;
    let admin_token = body["jwtToken"]["accessToken"].as_str().unwrap().to_string();
    let (status, body) = call_with_token(&state, "PATCH", "/example/jwt-auth", &admin_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claims"]["sub"], "admin@example.com");
    assert_eq!(body["claims"]["iss"], "tokengate-it");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let state = state();
    let pair = state
        .token_manager
        .issue_at(
            "dev@example.com",
            None,
            3_000,
            6_000,
            Utc::now() - Duration::minutes(5),
        )
        .unwrap();

    let (status, body) =
        call_with_token(&state, "GET", "/example/whoami", &pair.access_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["errorMessage"],
        "Full authentication is required to access this resource"
    );

    // Public routes still answer
    let (status, _) = call_with_token(&state, "GET", "/", &pair.access_token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn key_rotation_invalidates_outstanding_tokens() {
    let state = state();
    let (_, body) = generate(&state, json!({ "username": "dev@example.com" })).await;
    let old = body["jwtToken"]["accessToken"].as_str().unwrap().to_string();

    state
        .token_manager
        .reload_keys(KeyPair::load(ROTATED_PRIVATE, ROTATED_PUBLIC).unwrap());

    let (status, _) = call_with_token(&state, "GET", "/example/whoami", &old).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = generate(&state, json!({ "username": "dev@example.com" })).await;
    let new = body["jwtToken"]["accessToken"].as_str().unwrap().to_string();
    let (status, _) = call_with_token(&state, "GET", "/example/whoami", &new).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn token_signed_by_another_deployment_is_rejected() {
    let other = TokenManager::new(&JwtConfig {
        private_key: ROTATED_PRIVATE.to_string(),
        public_key: ROTATED_PUBLIC.to_string(),
        ..config()
    })
    .unwrap();
    let foreign = other.issue("dev@example.com").unwrap();

    let (status, _) =
        call_with_token(&state(), "GET", "/example/whoami", &foreign.access_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validation_errors_use_the_envelope() {
    let (status, body) = generate(&state(), json!({ "username": "nope" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errorCode"], "VALIDATION_FAILED");
    assert!(body["timestamp"].is_string());
}
