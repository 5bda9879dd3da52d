//! Handlers for account endpoints (register, profile, password).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use vidtube_core::accounts::{
    require_fields, validate_account_changes, validate_new_account, validate_password_strength,
    AccountChanges, NewAccount, MIN_PASSWORD_LENGTH,
};
use vidtube_core::error::CoreError;
use vidtube_db::models::user::{CreateUser, UpdateUser, UserResponse};

use crate::auth::AuthError;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

/// Request body for `PATCH /users/update-account`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

/// Request body for `POST /users/change-password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users/register
///
/// Create an account with an empty session. Returns 201 with the public
/// user view.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_fields(&[
        ("fullName", input.full_name.as_deref()),
        ("email", input.email.as_deref()),
        ("username", input.username.as_deref()),
        ("password", input.password.as_deref()),
        ("avatar", input.avatar.as_deref()),
    ])?;

    let account = NewAccount {
        full_name: input.full_name.unwrap_or_default(),
        email: input.email.unwrap_or_default(),
        username: input.username.unwrap_or_default(),
        password: input.password.unwrap_or_default(),
        avatar: input.avatar.unwrap_or_default(),
        cover_image: input.cover_image,
    }
    .normalized();
    validate_new_account(&account)?;

    let password_hash = state
        .passwords
        .hash(&account.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = state
        .store
        .create(&CreateUser {
            username: account.username,
            email: account.email,
            full_name: account.full_name,
            avatar: account.avatar,
            cover_image: account.cover_image,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok(ApiResponse::created(
        UserResponse::from(&user),
        "User registered successfully",
    ))
}

/// GET /api/v1/users/current-user
pub async fn current_user(auth_user: AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(auth_user.user, "User fetched successfully")
}

/// PATCH /api/v1/users/update-account
///
/// Update any subset of the profile fields. The refresh-token slot is not
/// touched.
pub async fn update_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateAccountRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let changes = AccountChanges {
        full_name: input.full_name,
        email: input.email,
        avatar: input.avatar,
        cover_image: input.cover_image,
    }
    .normalized();
    validate_account_changes(&changes)?;

    let updated = state
        .store
        .update_profile(
            auth_user.user_id,
            &UpdateUser {
                full_name: changes.full_name,
                email: changes.email,
                avatar: changes.avatar,
                cover_image: changes.cover_image,
            },
        )
        .await?
        .ok_or(AuthError::UserNotFound)?;

    tracing::info!(user_id = updated.id, "Account details updated");
    Ok(ApiResponse::ok(
        UserResponse::from(&updated),
        "Account details updated successfully",
    ))
}

/// POST /api/v1/users/change-password
///
/// Requires the current password. Existing sessions stay valid.
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = state
        .store
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let old_valid = state
        .passwords
        .verify(&input.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !old_valid {
        return Err(AppError::BadRequest("Invalid old password".into()));
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)?;

    let new_hash = state
        .passwords
        .hash(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !state.store.update_password(user.id, &new_hash).await? {
        return Err(CoreError::NotFound {
            entity: "User",
            key: format!("id {}", user.id),
        }
        .into());
    }

    tracing::info!(user_id = user.id, "Password changed");
    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    ))
}
