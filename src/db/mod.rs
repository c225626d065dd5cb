//! Database module
//!
//! Handles SQLite connection pooling, migrations and catalog seeding.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
