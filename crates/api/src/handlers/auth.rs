//! Handlers for the session endpoints (login, refresh, logout).

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use vidtube_core::accounts::require_fields;
use vidtube_db::models::user::UserResponse;

use crate::auth::cookie::{cookie_value, REFRESH_COOKIE_NAME};
use crate::auth::session::TokenPair;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/login`.
///
/// The identifier may be sent as `identifier`, `username`, or `email`; the
/// first one present wins.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /users/refresh-token` when no cookie is sent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Payload returned by login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Payload returned by refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users/login
///
/// Authenticate with username or email + password. Returns both tokens in
/// the body and as cookies.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(input): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginData>> {
    let identifier = input
        .identifier
        .or(input.username)
        .or(input.email)
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("username or email is required".into()))?;
    require_fields(&[("password", input.password.as_deref())])?;
    let password = input.password.unwrap_or_default();

    let outcome = state.sessions.login(&identifier, &password).await?;

    set_token_cookies(&state, &cookies, &outcome.tokens);
    let data = LoginData {
        user: outcome.user,
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
    };
    Ok(ApiResponse::ok(data, "User logged in successfully"))
}

/// POST /api/v1/users/refresh-token
///
/// Rotate the refresh token. The `refreshToken` cookie takes precedence over
/// a `{ "refreshToken": ... }` body.
pub async fn refresh_token(
    State(state): State<AppState>,
    cookies: Cookies,
    body: Bytes,
) -> AppResult<ApiResponse<TokenData>> {
    let presented = match cookie_value(&cookies, REFRESH_COOKIE_NAME) {
        Some(token) => Some(token),
        None if body.is_empty() => None,
        None => {
            serde_json::from_slice::<RefreshRequest>(&body)
                .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
                .refresh_token
        }
    };

    let tokens = state.sessions.refresh(presented.as_deref()).await?;

    set_token_cookies(&state, &cookies, &tokens);
    let data = TokenData {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    };
    Ok(ApiResponse::ok(data, "Access token refreshed"))
}

/// POST /api/v1/users/logout
///
/// Clear the caller's refresh-token slot and both cookies.
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
    auth_user: AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.sessions.logout(auth_user.user_id).await?;

    state.config.cookies.clear_tokens(&cookies);
    Ok(ApiResponse::ok(serde_json::json!({}), "User logged out"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Queue cookies for a freshly issued pair.
fn set_token_cookies(state: &AppState, cookies: &Cookies, tokens: &TokenPair) {
    state.config.cookies.set_tokens(
        cookies,
        tokens,
        state.codec.access_ttl_secs(),
        state.codec.refresh_ttl_secs(),
    );
}
