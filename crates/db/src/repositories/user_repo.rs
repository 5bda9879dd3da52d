//! Repository for the `users` table.
//!
//! The `refresh_token` column is the single refresh-token slot. It is only
//! written through [`UserRepo::set_refresh_token`],
//! [`UserRepo::swap_refresh_token`], and [`UserRepo::clear_refresh_token`].

use sqlx::PgPool;
use vidtube_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, full_name, avatar, cover_image, password_hash, \
                        refresh_token, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, full_name, avatar, cover_image, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.avatar)
            .bind(&input.cover_image)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user whose username or email equals `identifier`.
    ///
    /// Callers pass an already-normalized identifier.
    pub async fn find_by_identifier(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE username = $1 OR email = $1 ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if `username` or `email` is already taken.
    ///
    /// Usernames and emails share one login namespace, so each candidate is
    /// checked against both columns.
    pub async fn exists_with_username_or_email(
        pool: &PgPool,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM users
                WHERE username IN ($1, $2) OR email IN ($1, $2)
             )",
        )
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Returns `true` if a user other than `exclude_id` holds `identifier`
    /// as username or email.
    pub async fn identifier_taken_by_other(
        pool: &PgPool,
        identifier: &str,
        exclude_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM users
                WHERE (username = $1 OR email = $1) AND id <> $2
             )",
        )
        .bind(identifier)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }

    /// Update profile fields. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                avatar = COALESCE($4, avatar),
                cover_image = COALESCE($5, cover_image)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.avatar)
            .bind(&input.cover_image)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite the refresh-token slot unconditionally (login).
    ///
    /// Returns `true` if the row exists.
    pub async fn set_refresh_token(
        pool: &PgPool,
        id: DbId,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the slot only if it still holds `expected` (refresh rotation).
    ///
    /// This is a single conditional `UPDATE`, so two concurrent swaps from the
    /// same `expected` value cannot both succeed: the second one re-evaluates
    /// its `WHERE` clause against the committed row and matches nothing.
    /// Returns `true` if this call won the swap.
    pub async fn swap_refresh_token(
        pool: &PgPool,
        id: DbId,
        expected: &str,
        replacement: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $3 WHERE id = $1 AND refresh_token = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(replacement)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Empty the slot (logout). Clearing an empty slot is a no-op.
    pub async fn clear_refresh_token(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET refresh_token = NULL WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
