//! Session manager: issuance, rotation, and invalidation of token pairs.
//!
//! Each user has exactly one refresh-token slot. Login overwrites it, refresh
//! compare-and-swaps it from the presented token to the newly issued one, and
//! logout clears it. Because the swap is conditional at the store, two
//! concurrent refreshes of the same token cannot both produce a live session.

use std::sync::Arc;

use vidtube_core::accounts::normalize_identifier;
use vidtube_core::types::DbId;
use vidtube_db::models::user::{User, UserResponse};

use super::error::AuthError;
use super::jwt::{hash_refresh_token, ProfileClaims, TokenCodec, TokenKind};
use super::password::PasswordVerifier;
use super::store::CredentialStore;

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful [`SessionManager::login`].
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub user: UserResponse,
}

/// Orchestrates the token lifecycle against the credential store.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    passwords: Arc<dyn PasswordVerifier>,
    codec: Arc<TokenCodec>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordVerifier>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            store,
            passwords,
            codec,
        }
    }

    /// Authenticate with a username or email plus password.
    ///
    /// On success the user's slot holds the returned refresh token, replacing
    /// whatever session existed before.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let identifier = normalize_identifier(identifier);
        let user = self
            .store
            .find_by_identifier(&identifier)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| AuthError::Internal(format!("Password verification error: {e}")))?;
        if !password_valid {
            tracing::info!(user_id = user.id, "Login rejected: invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.issue_pair(&user)?;
        let written = self
            .store
            .set_refresh_token(user.id, &hash_refresh_token(&tokens.refresh_token))
            .await?;
        if !written {
            // Deleted between lookup and write.
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome {
            tokens,
            user: UserResponse::from(&user),
        })
    }

    /// Exchange the current refresh token for a new pair.
    ///
    /// The presented token becomes unusable as soon as this succeeds, even
    /// though it has not expired.
    pub async fn refresh(&self, presented: Option<&str>) -> Result<TokenPair, AuthError> {
        let presented = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.codec.verify(presented, TokenKind::Refresh)?;

        let user = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let presented_hash = hash_refresh_token(presented);
        if user.refresh_token.as_deref() != Some(presented_hash.as_str()) {
            tracing::warn!(user_id = user.id, "Refresh rejected: token is not the current one");
            return Err(AuthError::TokenStale);
        }

        let tokens = self.issue_pair(&user)?;
        let swapped = self
            .store
            .swap_refresh_token(
                user.id,
                &presented_hash,
                &hash_refresh_token(&tokens.refresh_token),
            )
            .await?;
        if !swapped {
            tracing::warn!(user_id = user.id, "Refresh rejected: slot changed concurrently");
            return Err(AuthError::TokenStale);
        }

        tracing::debug!(user_id = user.id, "Refresh token rotated");
        Ok(tokens)
    }

    /// End the user's session by clearing the slot. Safe to repeat.
    pub async fn logout(&self, user_id: DbId) -> Result<(), AuthError> {
        self.store.clear_refresh_token(user_id).await?;
        tracing::info!(user_id, "User logged out");
        Ok(())
    }

    fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        let profile = ProfileClaims {
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        };
        Ok(TokenPair {
            access_token: self.codec.issue_access_token(user.id, profile)?,
            refresh_token: self.codec.issue_refresh_token(user.id)?,
        })
    }
}
