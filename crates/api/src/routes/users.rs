//! Route definitions for the `/users` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{auth, user};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST  /register         -> register
/// POST  /login            -> login
/// POST  /logout           -> logout (requires auth)
/// POST  /refresh-token    -> refresh_token
/// POST  /change-password  -> change_password (requires auth)
/// GET   /current-user     -> current_user (requires auth)
/// PATCH /update-account   -> update_account (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(user::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/refresh-token", post(auth::refresh_token))
        .route("/change-password", post(user::change_password))
        .route("/current-user", get(user::current_user))
        .route("/update-account", patch(user::update_account))
}
