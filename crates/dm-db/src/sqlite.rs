//! SQLite ledger backend (file-based, single process)

use crate::connection::ConnectionInfo;
use crate::error::{says_already_exists, DbError, DbResult};
use crate::traits::Ledger;
use async_trait::async_trait;
use dm_core::ledger_sql::{create_table_sql, SELECT_APPLIED_SQL};
use dm_core::record::parse_ledger_timestamp;
use dm_core::LedgerEntry;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Executor, Row};
use tokio::sync::Mutex;

/// SQLite ledger over a single connection.
///
/// An in-memory database lives exactly as long as this value.
pub struct SqliteLedger {
    conn: Mutex<SqliteConnection>,
}

/// Translate a driver error, recognising the duplicate-table failure.
fn map_error(err: sqlx::Error, fallback: fn(String) -> DbError) -> DbError {
    match &err {
        sqlx::Error::Database(db) if says_already_exists(db.message()) => {
            DbError::TableExists(db.message().to_string())
        }
        _ => fallback(err.to_string()),
    }
}

impl SqliteLedger {
    /// Open an in-memory database
    pub async fn in_memory() -> DbResult<Self> {
        Self::open(":memory:").await
    }

    /// Open (creating if missing) the database file at `path`
    pub async fn open(path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| DbError::ConnectionError(format!("{e}: {path}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open the database named by a parsed connection string
    pub async fn connect(info: &ConnectionInfo) -> DbResult<Self> {
        if info.database.is_empty() {
            return Err(DbError::InvalidConnectionString(
                "sqlite connection string needs a database path, e.g. sqlite:///app.db".to_string(),
            ));
        }
        Self::open(&info.database).await
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn create_table(&self) -> DbResult<()> {
        let ddl = create_table_sql("datetime");
        let mut conn = self.conn.lock().await;
        (&mut *conn)
            .execute(ddl.as_str())
            .await
            .map_err(|e| map_error(e, DbError::ExecutionError))?;
        Ok(())
    }

    async fn applied_entries(&self) -> DbResult<Vec<LedgerEntry>> {
        let mut conn = self.conn.lock().await;
        let rows = sqlx::query(SELECT_APPLIED_SQL)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let filename: String = row.try_get("filename")?;
                let sha1: String = row.try_get("sha1")?;
                let mut entry = LedgerEntry::new(filename, sha1);
                // Rows written by other tools may hold any storage class here.
                entry.applied_at = match row.try_get::<Option<String>, _>("date") {
                    Ok(date) => date.as_deref().and_then(parse_ledger_timestamp),
                    Err(e) => {
                        log::debug!("Ignoring unreadable date for {}: {e}", entry.filename);
                        None
                    }
                };
                Ok(entry)
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn execute(&self, batch: &str) -> DbResult<()> {
        let mut conn = self.conn.lock().await;
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| DbError::ExecutionError(format!("BEGIN failed: {e}")))?;
        if let Err(e) = (&mut *tx).execute(batch).await {
            // Dropping the transaction rolls the batch back.
            return Err(DbError::ExecutionError(e.to_string()));
        }
        tx.commit()
            .await
            .map_err(|e| DbError::ExecutionError(format!("COMMIT failed: {e}")))
    }

    fn date_function(&self) -> &'static str {
        "datetime"
    }

    fn engine_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
