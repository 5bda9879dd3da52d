//! Access/refresh token codec.
//!
//! Both token kinds are HS256-signed JWTs, but each kind has its own signing
//! secret and carries a `kind` claim, so an access token can never be
//! presented as a refresh token or the other way round. A refresh token's
//! authority additionally depends on the user's stored slot; only its SHA-256
//! digest is persisted (see [`hash_refresh_token`]) so a database leak does not
//! compromise active sessions.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use vidtube_core::types::DbId;

/// Which of the two token kinds a JWT was minted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn other(self) -> Self {
        match self {
            TokenKind::Access => TokenKind::Refresh,
            TokenKind::Refresh => TokenKind::Access,
        }
    }
}

/// Profile fields embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileClaims {
    pub username: String,
    pub email: String,
    pub full_name: String,
}

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    pub kind: TokenKind,
    /// Present on access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileClaims>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4); makes every issued token distinct.
    pub jti: String,
}

/// Failures from [`TokenCodec::verify`] and token issuance.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is malformed or its signature is invalid")]
    Malformed,

    #[error("expected a {expected:?} token")]
    KindMismatch { expected: TokenKind },

    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: String,
    /// Access token lifetime.
    pub access_token_ttl: Duration,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from `access_secret`.
    pub refresh_secret: String,
    /// Refresh token lifetime.
    pub refresh_token_ttl: Duration,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 10;

impl JwtConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `ACCESS_TOKEN_SECRET`       | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRY_MINS`  | no       | `15`    |
    /// | `REFRESH_TOKEN_SECRET`      | **yes**  | --      |
    /// | `REFRESH_TOKEN_EXPIRY_DAYS` | no       | `10`    |
    ///
    /// # Panics
    ///
    /// Panics if either secret is missing or empty, if the two secrets are
    /// equal, or if an expiry is not a positive integer.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .expect("ACCESS_TOKEN_SECRET must be set in the environment");
        assert!(!access_secret.is_empty(), "ACCESS_TOKEN_SECRET must not be empty");

        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET")
            .expect("REFRESH_TOKEN_SECRET must be set in the environment");
        assert!(!refresh_secret.is_empty(), "REFRESH_TOKEN_SECRET must not be empty");
        assert_ne!(
            access_secret, refresh_secret,
            "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ"
        );

        let access_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRY_MINS must be a valid i64");
        assert!(access_mins > 0, "ACCESS_TOKEN_EXPIRY_MINS must be positive");

        let refresh_days: i64 = std::env::var("REFRESH_TOKEN_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("REFRESH_TOKEN_EXPIRY_DAYS must be a valid i64");
        assert!(refresh_days > 0, "REFRESH_TOKEN_EXPIRY_DAYS must be positive");

        Self {
            access_secret,
            access_token_ttl: Duration::minutes(access_mins),
            refresh_secret,
            refresh_token_ttl: Duration::days(refresh_days),
        }
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs and verifies both token kinds.
///
/// Keys are derived once at construction; the codec is cheap to share behind
/// an `Arc`.
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            access: KeyPair::from_secret(&config.access_secret),
            refresh: KeyPair::from_secret(&config.refresh_secret),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            validation,
        }
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Refresh token lifetime in seconds (used for cookie `Max-Age`).
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }

    /// Issue a short-lived access token carrying the user's profile claims.
    pub fn issue_access_token(
        &self,
        user_id: DbId,
        profile: ProfileClaims,
    ) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Access, Some(profile))
    }

    /// Issue a long-lived refresh token for the user.
    pub fn issue_refresh_token(&self, user_id: DbId) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Refresh, None)
    }

    /// Verify a token's signature, expiry, and kind, returning its [`Claims`].
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        match decode::<Claims>(token, &self.keys(expected).decoding, &self.validation) {
            Ok(data) if data.claims.kind == expected => Ok(data.claims),
            Ok(_) => Err(TokenError::KindMismatch { expected }),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                ErrorKind::InvalidSignature if self.signed_as(token, expected.other()) => {
                    Err(TokenError::KindMismatch { expected })
                }
                _ => Err(TokenError::Malformed),
            },
        }
    }

    fn issue(
        &self,
        user_id: DbId,
        kind: TokenKind,
        profile: Option<ProfileClaims>,
    ) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: user_id,
            kind,
            profile,
            exp: now + ttl.num_seconds(),
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(kind).encoding,
        )
        .map_err(TokenError::Signing)
    }

    /// Whether `token` carries a valid signature under `kind`'s key,
    /// regardless of expiry.
    fn signed_as(&self, token: &str, kind: TokenKind) -> bool {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;
        decode::<Claims>(token, &self.keys(kind).decoding, &validation).is_ok()
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

/// Compute the SHA-256 hex digest of a refresh token.
///
/// The slot stores this digest; compare an incoming token by hashing it.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
