//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use vidtube_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash and the refresh-token slot -- NEVER serialize
/// this to API responses directly. Use [`UserResponse`] for external-facing
/// output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password_hash: String,
    /// Digest of the one refresh token that may currently be exchanged.
    pub refresh_token: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Whether `identifier` equals this user's username or email.
    ///
    /// Login accepts either, so the two share one namespace.
    pub fn holds_identifier(&self, identifier: &str) -> bool {
        self.username == identifier || self.email == identifier
    }
}

/// Safe user representation for API responses (no password hash, no slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
            cover_image: user.cover_image.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user. The refresh-token slot always starts empty.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password_hash: String,
}

/// DTO for updating profile fields. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}
