//! Request authentication.
//!
//! - [`auth::authenticate`] -- verifies the bearer access token on a request.
//! - [`auth::AuthUser`] -- extractor wrapping it for protected handlers.

pub mod auth;
