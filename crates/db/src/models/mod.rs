//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Serialize` response struct that is safe to return to clients
//! - Create / update DTOs for writes

pub mod user;
