//! Domain types shared by the persistence and HTTP crates.

pub mod accounts;
pub mod error;
pub mod types;
