use std::sync::Arc;

use crate::auth::jwt::TokenCodec;
use crate::auth::password::PasswordVerifier;
use crate::auth::session::SessionManager;
use crate::auth::store::CredentialStore;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// User records and the refresh-token slot.
    pub store: Arc<dyn CredentialStore>,
    /// Password hashing for registration and password change.
    pub passwords: Arc<dyn PasswordVerifier>,
    /// Access/refresh token codec.
    pub codec: Arc<TokenCodec>,
    /// Login, refresh, and logout.
    pub sessions: Arc<SessionManager>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the session manager and codec around a store and verifier.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordVerifier>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(&config.jwt));
        let sessions = Arc::new(SessionManager::new(
            Arc::clone(&store),
            Arc::clone(&passwords),
            Arc::clone(&codec),
        ));
        Self {
            store,
            passwords,
            codec,
            sessions,
            config: Arc::new(config),
        }
    }
}
