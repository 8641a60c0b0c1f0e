//! dm-db - Ledger backends for dbmigrate
//!
//! This crate provides the `Ledger` trait (the persisted `dbmigration` table
//! and statement execution), connection-string parsing, the scheme-keyed
//! `EngineRegistry`, and implementations for sqlite, DuckDB, PostgreSQL and
//! MySQL.

pub mod connection;
pub mod duckdb;
pub mod error;
pub mod mysql;
pub mod postgres;
pub mod registry;
pub mod sqlite;
pub mod traits;

pub use connection::ConnectionInfo;
pub use crate::duckdb::DuckDbLedger;
pub use error::{DbError, DbResult};
pub use mysql::MySqlLedger;
pub use postgres::PostgresLedger;
pub use registry::{EngineFactory, EngineRegistry};
pub use sqlite::SqliteLedger;
pub use traits::Ledger;
