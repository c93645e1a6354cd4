//! Database layer
//!
//! Connection pooling and schema migrations.

mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
