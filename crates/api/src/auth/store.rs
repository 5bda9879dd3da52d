//! Credential store adapter.
//!
//! [`CredentialStore`] is the seam between the session manager and wherever
//! user records live. The refresh-token slot is only ever written through
//! [`CredentialStore::set_refresh_token`], [`CredentialStore::swap_refresh_token`],
//! and [`CredentialStore::clear_refresh_token`], and every implementation must
//! make `swap_refresh_token` an atomic compare-and-swap.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use vidtube_core::types::DbId;
use vidtube_db::models::user::{CreateUser, UpdateUser, User};
use vidtube_db::repositories::UserRepo;
use vidtube_db::DbPool;

/// Failures surfaced by a [`CredentialStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique identifier (username or email) is already taken.
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;

    /// Look up by username or email. `identifier` is already normalized.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError>;

    /// Insert a user with an empty refresh-token slot.
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError>;

    async fn update_profile(
        &self,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, StoreError>;

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, StoreError>;

    /// Overwrite the slot unconditionally. Returns `false` if the user is gone.
    async fn set_refresh_token(&self, id: DbId, token_hash: &str) -> Result<bool, StoreError>;

    /// Atomically replace the slot if it still equals `expected`.
    ///
    /// Returns `true` only for the caller that performed the replacement.
    async fn swap_refresh_token(
        &self,
        id: DbId,
        expected: &str,
        replacement: &str,
    ) -> Result<bool, StoreError>;

    /// Empty the slot. Idempotent.
    async fn clear_refresh_token(&self, id: DbId) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// [`CredentialStore`] over the `users` table.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map Postgres unique violations on `uq_*` constraints to [`StoreError::Conflict`].
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return StoreError::Conflict(
                    "User with email or username already exists".to_string(),
                );
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_identifier(&self.pool, identifier).await?)
    }

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        if UserRepo::exists_with_username_or_email(&self.pool, &input.username, &input.email)
            .await?
        {
            return Err(StoreError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }
        // The pre-check gives a friendly answer; the unique constraints still
        // decide races between concurrent registrations.
        UserRepo::create(&self.pool, input).await.map_err(classify)
    }

    async fn update_profile(
        &self,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, StoreError> {
        if let Some(email) = &input.email {
            if UserRepo::identifier_taken_by_other(&self.pool, email, id).await? {
                return Err(StoreError::Conflict(
                    "User with email or username already exists".to_string(),
                ));
            }
        }
        UserRepo::update(&self.pool, id, input).await.map_err(classify)
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, StoreError> {
        Ok(UserRepo::update_password(&self.pool, id, password_hash).await?)
    }

    async fn set_refresh_token(&self, id: DbId, token_hash: &str) -> Result<bool, StoreError> {
        Ok(UserRepo::set_refresh_token(&self.pool, id, token_hash).await?)
    }

    async fn swap_refresh_token(
        &self,
        id: DbId,
        expected: &str,
        replacement: &str,
    ) -> Result<bool, StoreError> {
        Ok(UserRepo::swap_refresh_token(&self.pool, id, expected, replacement).await?)
    }

    async fn clear_refresh_token(&self, id: DbId) -> Result<(), StoreError> {
        Ok(UserRepo::clear_refresh_token(&self.pool, id).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    next_id: DbId,
    users: HashMap<DbId, User>,
}

/// Process-local [`CredentialStore`] used by tests and local experiments.
///
/// Every slot operation runs under a single write guard, so the
/// compare-and-swap is atomic.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .filter(|u| u.holds_identifier(identifier))
            .min_by_key(|u| u.id)
            .cloned())
    }

    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| {
            u.holds_identifier(&input.username) || u.holds_identifier(&input.email)
        }) {
            return Err(StoreError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: inner.next_id,
            username: input.username.clone(),
            email: input.email.clone(),
            full_name: input.full_name.clone(),
            avatar: input.avatar.clone(),
            cover_image: input.cover_image.clone(),
            password_hash: input.password_hash.clone(),
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(email) = &input.email {
            if inner
                .users
                .values()
                .any(|u| u.id != id && u.holds_identifier(email))
            {
                return Err(StoreError::Conflict(
                    "User with email or username already exists".to_string(),
                ));
            }
        }

        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(full_name) = &input.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(email) = &input.email {
            user.email = email.clone();
        }
        if let Some(avatar) = &input.avatar {
            user.avatar = avatar.clone();
        }
        if let Some(cover_image) = &input.cover_image {
            user.cover_image = Some(cover_image.clone());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(match inner.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_refresh_token(&self, id: DbId, token_hash: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(match inner.users.get_mut(&id) {
            Some(user) => {
                user.refresh_token = Some(token_hash.to_string());
                true
            }
            None => false,
        })
    }

    async fn swap_refresh_token(
        &self,
        id: DbId,
        expected: &str,
        replacement: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(match inner.users.get_mut(&id) {
            Some(user) if user.refresh_token.as_deref() == Some(expected) => {
                user.refresh_token = Some(replacement.to_string());
                true
            }
            _ => false,
        })
    }

    async fn clear_refresh_token(&self, id: DbId) -> Result<(), StoreError> {
        if let Some(user) = self.inner.write().await.users.get_mut(&id) {
            user.refresh_token = None;
        }
        Ok(())
    }
}
