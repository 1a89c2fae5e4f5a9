//! Detour Storage Layer
//!
//! A single-table SQLite key-value store. The content script keeps exactly one
//! preference here (the last-used placeholder button label), read once at startup.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
