use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vidtube_core::error::CoreError;

use crate::auth::jwt::TokenError;
use crate::auth::store::StoreError;
use crate::auth::AuthError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`AuthError`] for the session
/// boundary, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce the `{ statusCode, code, message, errors, success }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `vidtube_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A session or request-authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Auth(err.into())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal(detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with {key} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- AuthError variants ---
            AppError::Auth(auth) => match auth {
                AuthError::MissingToken | AuthError::Unauthorized(_) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", auth.to_string())
                }
                AuthError::Token(TokenError::Expired) => (
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_EXPIRED",
                    "Token has expired".to_string(),
                ),
                AuthError::Token(_) | AuthError::InvalidToken => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_TOKEN",
                    "Invalid refresh token".to_string(),
                ),
                AuthError::TokenStale => {
                    (StatusCode::UNAUTHORIZED, "TOKEN_STALE", auth.to_string())
                }
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    auth.to_string(),
                ),
                AuthError::UserNotFound => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", auth.to_string())
                }
                AuthError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                AuthError::Internal(msg) => internal(msg),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let mut body = json!({
            "statusCode": status.as_u16(),
            "code": code,
            "message": message,
            "errors": [],
            "success": false,
        });
        if cfg!(debug_assertions) && status == StatusCode::INTERNAL_SERVER_ERROR {
            body["detail"] = json!(self.to_string());
        }

        (status, axum::Json(body)).into_response()
    }
}
