#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vidtube_api::auth::cookie::CookieConfig;
use vidtube_api::auth::jwt::JwtConfig;
use vidtube_api::auth::password::Argon2Verifier;
use vidtube_api::auth::store::MemoryCredentialStore;
use vidtube_api::config::ServerConfig;
use vidtube_api::router::build_app_router;
use vidtube_api::state::AppState;

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and fixed token secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            access_secret: "integration-access-secret".to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_secret: "integration-refresh-secret".to_string(),
            refresh_token_ttl: Duration::days(10),
        },
        cookies: CookieConfig::default(),
    }
}

/// App state over an in-memory store with cheap Argon2 parameters.
pub fn test_state() -> AppState {
    AppState::new(
        test_config(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(Argon2Verifier::with_params(
            Params::new(8, 1, 1, None).unwrap(),
        )),
    )
}

/// Build the full application router with all middleware layers.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app(state: AppState) -> Router {
    let config = state.config.as_ref().clone();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth_with_cookie(
    app: Router,
    uri: &str,
    token: &str,
    cookie: &str,
) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body, None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send_json(app, Method::POST, uri, body, Some(token)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send_json(app, Method::PATCH, uri, body, Some(token)).await
}

pub async fn post_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values on a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

/// Register `username` with [`TEST_PASSWORD`] and return the created user JSON.
pub async fn register_user(app: Router, username: &str) -> serde_json::Value {
    let body = serde_json::json!({
        "fullName": "Test User",
        "email": format!("{username}@test.com"),
        "username": username,
        "password": TEST_PASSWORD,
        "avatar": format!("https://cdn.test/{username}.png"),
    });
    let response = post_json(app, "/api/v1/users/register", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Log in via the API and return the `data` payload (`user`, `accessToken`,
/// `refreshToken`).
pub async fn login_user(app: Router, identifier: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "identifier": identifier, "password": password });
    let response = post_json(app, "/api/v1/users/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["data"].clone()
}
