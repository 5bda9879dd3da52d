//! Error kinds at the session manager / request authenticator boundary.
//!
//! Store and signing failures are folded into [`AuthError::Internal`] or
//! [`AuthError::Conflict`] here, so no raw `sqlx` or `jsonwebtoken` error
//! crosses into handlers.

use super::jwt::TokenError;
use super::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token was presented where one is required.
    #[error("Unauthorized request")]
    MissingToken,

    /// The presented token failed verification (expired, malformed, or of
    /// the wrong kind).
    #[error(transparent)]
    Token(TokenError),

    /// A well-formed refresh token whose subject no longer exists.
    #[error("Invalid refresh token")]
    InvalidToken,

    /// A refresh token that no longer matches the user's slot: already
    /// rotated, logged out, or superseded by another login.
    #[error("Refresh token is expired or used")]
    TokenStale,

    #[error("User doesn't exist")]
    UserNotFound,

    #[error("Invalid user credentials")]
    InvalidCredentials,

    /// Request authentication failed; the message says why.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => AuthError::Internal(format!("Token generation error: {e}")),
            other => AuthError::Token(other),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AuthError::Conflict(msg),
            StoreError::Database(e) => AuthError::Internal(format!("Credential store error: {e}")),
        }
    }
}
