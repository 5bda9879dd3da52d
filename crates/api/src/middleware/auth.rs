//! JWT-based request authenticator and its Axum extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tower_cookies::Cookies;
use vidtube_core::types::DbId;
use vidtube_db::models::user::UserResponse;

use crate::auth::cookie::{cookie_value, ACCESS_COOKIE_NAME};
use crate::auth::jwt::{TokenCodec, TokenKind};
use crate::auth::store::CredentialStore;
use crate::auth::AuthError;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity resolved from an access token.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Snapshot of the user's public profile at authentication time.
    pub user: UserResponse,
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// The request's access token: the `accessToken` cookie if present,
/// otherwise the bearer header.
pub fn access_token(cookies: Option<&Cookies>, headers: &HeaderMap) -> Option<String> {
    cookies
        .and_then(|jar| cookie_value(jar, ACCESS_COOKIE_NAME))
        .or_else(|| bearer_token(headers))
}

/// Verify a presented access token and resolve its subject.
///
/// Every failure is reported as [`AuthError::Unauthorized`]; the underlying
/// token error is only logged. Never writes to the store.
pub async fn authenticate(
    token: Option<&str>,
    codec: &TokenCodec,
    store: &dyn CredentialStore,
) -> Result<AuthUser, AuthError> {
    let token = token.ok_or_else(|| AuthError::Unauthorized("Unauthorized request".into()))?;

    let claims = codec.verify(token, TokenKind::Access).map_err(|e| {
        tracing::debug!(error = %e, "Access token rejected");
        AuthError::Unauthorized("Invalid or expired access token".into())
    })?;

    let user = store
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AuthError::Unauthorized("Invalid access token".into()))?;

    Ok(AuthUser {
        user_id: user.id,
        user: UserResponse::from(&user),
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Populated by `CookieManagerLayer`.
        let cookies = parts.extensions.get::<Cookies>();
        let token = access_token(cookies, &parts.headers);

        Ok(authenticate(token.as_deref(), &state.codec, state.store.as_ref()).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use vidtube_db::models::user::CreateUser;

    use super::*;
    use crate::auth::jwt::{JwtConfig, ProfileClaims};
    use crate::auth::store::MemoryCredentialStore;

    fn codec() -> TokenCodec {
        TokenCodec::new(&JwtConfig {
            access_secret: "access-secret-for-authenticator".to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_secret: "refresh-secret-for-authenticator".to_string(),
            refresh_token_ttl: Duration::days(10),
        })
    }

    fn profile() -> ProfileClaims {
        ProfileClaims {
            username: "ada".to_string(),
            email: "ada@test.com".to_string(),
            full_name: "Ada".to_string(),
        }
    }

    async fn store_with_user() -> (Arc<MemoryCredentialStore>, DbId) {
        let store = Arc::new(MemoryCredentialStore::new());
        let user = store
            .create(&CreateUser {
                username: "ada".to_string(),
                email: "ada@test.com".to_string(),
                full_name: "Ada".to_string(),
                avatar: "https://cdn.test/ada.png".to_string(),
                cover_image: None,
                password_hash: "unused".to_string(),
            })
            .await
            .unwrap();
        (store, user.id)
    }

    #[test]
    fn bearer_header_is_read_without_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(access_token(None, &headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn valid_token_resolves_identity() {
        let (store, id) = store_with_user().await;
        let codec = codec();
        let token = codec.issue_access_token(id, profile()).unwrap();

        let user = authenticate(Some(&token), &codec, store.as_ref())
            .await
            .unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.user.username, "ada");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (store, _) = store_with_user().await;
        assert_matches!(
            authenticate(None, &codec(), store.as_ref()).await,
            Err(AuthError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let (store, id) = store_with_user().await;
        let codec = codec();
        let refresh = codec.issue_refresh_token(id).unwrap();

        assert_matches!(
            authenticate(Some(&refresh), &codec, store.as_ref()).await,
            Err(AuthError::Unauthorized(_))
        );
    }

    #[tokio::test]
    async fn deleted_subject_is_unauthorized() {
        let (store, _) = store_with_user().await;
        let codec = codec();
        let token = codec.issue_access_token(4_242, profile()).unwrap();

        assert_matches!(
            authenticate(Some(&token), &codec, store.as_ref()).await,
            Err(AuthError::Unauthorized(_))
        );
    }
}
