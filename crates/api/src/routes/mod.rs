pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/register                  register
/// /users/login                     login
/// /users/logout                    logout (requires auth)
/// /users/refresh-token             refresh-token rotation
/// /users/change-password           change password (requires auth)
/// /users/current-user              current user (requires auth)
/// /users/update-account            profile update (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Account and session routes.
        .nest("/users", users::router())
}
