//! Credential and session-token lifecycle.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access/refresh token codec and refresh-token digests.
//! - [`store`] -- the credential store seam (Postgres and in-memory).
//! - [`session`] -- login, refresh-token rotation, and logout.
//! - [`cookie`] -- reading and writing the token cookies.

pub mod cookie;
pub mod error;
pub mod jwt;
pub mod password;
pub mod session;
pub mod store;

pub use error::AuthError;
