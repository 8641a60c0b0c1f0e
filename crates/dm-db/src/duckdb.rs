//! DuckDB ledger backend

use crate::connection::ConnectionInfo;
use crate::error::{says_already_exists, DbError, DbResult};
use crate::traits::Ledger;
use async_trait::async_trait;
use dm_core::ledger_sql::{create_table_sql, LEDGER_TABLE};
use dm_core::record::parse_ledger_timestamp;
use dm_core::LedgerEntry;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB ledger backend
pub struct DuckDbLedger {
    conn: Mutex<Connection>,
}

/// Translate a driver error, recognising the duplicate-table failure.
///
/// duckdb::Error does not expose structured variants, so the catalog message
/// is the only signal.
fn map_error(err: duckdb::Error, fallback: fn(String) -> DbError) -> DbError {
    let msg = err.to_string();
    if says_already_exists(&msg) {
        DbError::TableExists(msg)
    } else {
        fallback(msg)
    }
}

impl DuckDbLedger {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from a parsed connection string (handles the `:memory:` special case)
    pub fn connect(info: &ConnectionInfo) -> DbResult<Self> {
        if info.is_in_memory() {
            Self::in_memory()
        } else if info.database.is_empty() {
            Err(DbError::InvalidConnectionString(
                "duckdb connection string needs a database path, e.g. duckdb:///app.duckdb"
                    .to_string(),
            ))
        } else {
            Self::from_path(Path::new(&info.database))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn create_table_sync(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&create_table_sql("timestamp"))
            .map_err(|e| map_error(e, DbError::ExecutionError))
    }

    fn applied_entries_sync(&self) -> DbResult<Vec<LedgerEntry>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT filename, sha1, CAST(date AS VARCHAR) FROM {} ORDER BY filename",
            LEDGER_TABLE
        );
        let query_err = |e: duckdb::Error| DbError::QueryError(e.to_string());

        let mut stmt = conn.prepare(&sql).map_err(query_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .map_err(query_err)?;

        let mut entries = Vec::new();
        for row in rows {
            let (filename, sha1, date) = row.map_err(query_err)?;
            let mut entry = LedgerEntry::new(filename, sha1);
            entry.applied_at = date.as_deref().and_then(parse_ledger_timestamp);
            entries.push(entry);
        }
        Ok(entries)
    }

    fn execute_sync(&self, batch: &str) -> DbResult<()> {
        let mut conn = self.lock()?;
        let exec_err = |e: duckdb::Error| DbError::ExecutionError(e.to_string());

        let tx = conn.transaction().map_err(exec_err)?;
        // An uncommitted transaction rolls back when dropped.
        tx.execute_batch(batch).map_err(exec_err)?;
        tx.commit().map_err(exec_err)
    }
}

#[async_trait]
impl Ledger for DuckDbLedger {
    async fn create_table(&self) -> DbResult<()> {
        self.create_table_sync()
    }

    async fn applied_entries(&self) -> DbResult<Vec<LedgerEntry>> {
        self.applied_entries_sync()
    }

    async fn execute(&self, batch: &str) -> DbResult<()> {
        self.execute_sync(batch)
    }

    fn date_function(&self) -> &'static str {
        "now"
    }

    fn engine_name(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
