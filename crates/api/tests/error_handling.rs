//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct HTTP
//! status code, error code, and envelope. They do NOT need an HTTP server --
//! they call `IntoResponse` directly on `AppError` values.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use vidtube_api::auth::jwt::{TokenError, TokenKind};
use vidtube_api::auth::store::StoreError;
use vidtube_api::auth::AuthError;
use vidtube_api::error::AppError;
use vidtube_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Envelope shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn error_envelope_has_standard_fields() {
    let (status, json) = error_to_response(AppError::BadRequest("bad input".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["statusCode"], 400);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["message"], "bad input");
    assert_eq!(json["errors"], serde_json::json!([]));
    assert_eq!(json["success"], false);
}

// ---------------------------------------------------------------------------
// CoreError
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "User",
        key: "id 42".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "User with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("email is required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "email is required");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["message"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// AuthError
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_failures_return_401() {
    let cases = [
        (AuthError::MissingToken, "UNAUTHORIZED"),
        (AuthError::InvalidCredentials, "INVALID_CREDENTIALS"),
        (AuthError::InvalidToken, "INVALID_TOKEN"),
        (AuthError::TokenStale, "TOKEN_STALE"),
        (AuthError::Token(TokenError::Malformed), "INVALID_TOKEN"),
        (
            AuthError::Token(TokenError::KindMismatch {
                expected: TokenKind::Refresh,
            }),
            "INVALID_TOKEN",
        ),
        (AuthError::Token(TokenError::Expired), "TOKEN_EXPIRED"),
        (
            AuthError::Unauthorized("Invalid access token".into()),
            "UNAUTHORIZED",
        ),
    ];

    for (err, code) in cases {
        let (status, json) = error_to_response(AppError::Auth(err)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], code);
    }
}

#[tokio::test]
async fn user_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Auth(AuthError::UserNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User doesn't exist");
}

#[tokio::test]
async fn store_conflict_returns_409() {
    let err = AppError::from(StoreError::Conflict(
        "User with email or username already exists".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "User with email or username already exists");
}

#[tokio::test]
async fn auth_internal_is_sanitized() {
    let err = AppError::Auth(AuthError::Internal("pool timed out on secret-host".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "An internal error occurred");
}
