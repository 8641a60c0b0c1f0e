//! Ledger trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use dm_core::LedgerEntry;

/// The persisted record of applied migrations plus the connection that
/// migrations run on.
///
/// Implementations must be Send + Sync for async operation. Each backend maps
/// its native driver errors onto [`DbError`](crate::DbError) so callers can
/// branch on `TableExists` and `QueryError` without knowing the engine.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Create the `dbmigration` table.
    ///
    /// Returns `DbError::TableExists` when the table was already there, which
    /// is how callers tell a brand-new database from an existing one.
    async fn create_table(&self) -> DbResult<()>;

    /// All ledger rows sorted by filename.
    ///
    /// Fails with `DbError::QueryError` if the table does not exist.
    async fn applied_entries(&self) -> DbResult<Vec<LedgerEntry>>;

    /// Run one or more statements as a unit.
    ///
    /// On failure the batch is rolled back and `DbError::ExecutionError` is
    /// returned; batches committed earlier are unaffected.
    async fn execute(&self, batch: &str) -> DbResult<()>;

    /// Name of the engine's current-timestamp function, called without arguments
    fn date_function(&self) -> &'static str;

    /// Engine identifier for logging
    fn engine_name(&self) -> &'static str;
}
