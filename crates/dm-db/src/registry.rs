//! Scheme-keyed engine registry.
//!
//! The connection string's scheme picks the factory that opens a [`Ledger`].
//! `builtin()` knows sqlite, duckdb, postgresql (alias `postgres`) and mysql;
//! further engines can be added with [`EngineRegistry::register`].

use crate::connection::ConnectionInfo;
use crate::duckdb::DuckDbLedger;
use crate::error::{DbError, DbResult};
use crate::mysql::MySqlLedger;
use crate::postgres::PostgresLedger;
use crate::sqlite::SqliteLedger;
use crate::traits::Ledger;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Opens a ledger for one engine
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn connect(&self, info: &ConnectionInfo) -> DbResult<Box<dyn Ledger>>;
}

struct SqliteFactory;
struct DuckDbFactory;
struct PostgresFactory;
struct MySqlFactory;

#[async_trait]
impl EngineFactory for SqliteFactory {
    async fn connect(&self, info: &ConnectionInfo) -> DbResult<Box<dyn Ledger>> {
        Ok(Box::new(SqliteLedger::connect(info).await?))
    }
}

#[async_trait]
impl EngineFactory for DuckDbFactory {
    async fn connect(&self, info: &ConnectionInfo) -> DbResult<Box<dyn Ledger>> {
        Ok(Box::new(DuckDbLedger::connect(info)?))
    }
}

#[async_trait]
impl EngineFactory for PostgresFactory {
    async fn connect(&self, info: &ConnectionInfo) -> DbResult<Box<dyn Ledger>> {
        Ok(Box::new(PostgresLedger::connect(info).await?))
    }
}

#[async_trait]
impl EngineFactory for MySqlFactory {
    async fn connect(&self, info: &ConnectionInfo) -> DbResult<Box<dyn Ledger>> {
        Ok(Box::new(MySqlLedger::connect(info).await?))
    }
}

/// Map from connection-string scheme to engine factory
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: BTreeMap<String, Arc<dyn EngineFactory>>,
}

impl EngineRegistry {
    /// A registry with no engines
    pub fn empty() -> Self {
        Self::default()
    }

    /// The engines shipped with dbmigrate
    pub fn builtin() -> Self {
        let postgres: Arc<dyn EngineFactory> = Arc::new(PostgresFactory);
        Self::empty()
            .register("sqlite", Arc::new(SqliteFactory))
            .register("duckdb", Arc::new(DuckDbFactory))
            .register("postgresql", Arc::clone(&postgres))
            .register("postgres", postgres)
            .register("mysql", Arc::new(MySqlFactory))
    }

    /// Add (or replace) the factory for `scheme`
    pub fn register(mut self, scheme: &str, factory: Arc<dyn EngineFactory>) -> Self {
        self.engines.insert(scheme.to_ascii_lowercase(), factory);
        self
    }

    /// Registered schemes in sorted order
    pub fn schemes(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    /// Parse `connection_string` and open a ledger with the matching engine
    pub async fn connect(&self, connection_string: &str) -> DbResult<Box<dyn Ledger>> {
        let info = ConnectionInfo::parse(connection_string)?;
        let factory = self
            .engines
            .get(&info.scheme)
            .ok_or_else(|| DbError::UnsupportedEngine {
                scheme: info.scheme.clone(),
                supported: self.schemes().join(", "),
            })?;

        log::debug!("Connecting to {}", info);
        factory.connect(&info).await
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
