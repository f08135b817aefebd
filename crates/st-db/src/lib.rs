//! st-db - Database abstraction layer for Stratum
//!
//! This crate provides the synchronous `Database` trait the migration
//! engine talks to, the DuckDB implementation, and `connect` for opening a
//! connection from a configured driver and url.

pub mod connect;
pub mod duckdb;
pub mod error;
pub mod traits;

pub use connect::connect;
pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
