//! PostgreSQL ledger backend

use crate::connection::ConnectionInfo;
use crate::error::{DbError, DbResult};
use crate::traits::Ledger;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use dm_core::ledger_sql::{create_table_sql, SELECT_APPLIED_SQL};
use dm_core::LedgerEntry;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor, Row};
use tokio::sync::Mutex;

/// SQLSTATE for `duplicate_table`
const DUPLICATE_TABLE: &str = "42P07";

/// PostgreSQL ledger over a single connection
pub struct PostgresLedger {
    conn: Mutex<PgConnection>,
}

fn map_error(err: sqlx::Error, fallback: fn(String) -> DbError) -> DbError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(DUPLICATE_TABLE) => {
            DbError::TableExists(db.message().to_string())
        }
        _ => fallback(err.to_string()),
    }
}

/// Build driver options from the parsed connection string.
///
/// Parts left out of the string fall back to libpq defaults (`PGHOST`,
/// `PGUSER`, ...), which `PgConnectOptions::new` reads from the environment.
pub(crate) fn connect_options(info: &ConnectionInfo) -> PgConnectOptions {
    let mut options = PgConnectOptions::new();
    if let Some(host) = &info.host {
        options = options.host(host);
    }
    if let Some(port) = info.port {
        options = options.port(port);
    }
    if let Some(user) = &info.user {
        options = options.username(user);
    }
    if let Some(password) = &info.password {
        options = options.password(password);
    }
    if !info.database.is_empty() {
        options = options.database(&info.database);
    }
    options
}

impl PostgresLedger {
    /// Connect to the server named by a parsed connection string
    pub async fn connect(info: &ConnectionInfo) -> DbResult<Self> {
        let conn = PgConnection::connect_with(&connect_options(info))
            .await
            .map_err(|e| DbError::ConnectionError(format!("{e}: {info}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Ledger for PostgresLedger {
    async fn create_table(&self) -> DbResult<()> {
        let ddl = create_table_sql("timestamp");
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
                let mut entry = LedgerEntry::new(
                    row.try_get::<String, _>("filename")?,
                    row.try_get::<String, _>("sha1")?,
                );
                entry.applied_at = match row.try_get::<Option<NaiveDateTime>, _>("date") {
                    Ok(date) => date,
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
        // No bind arguments, so the batch goes over the simple query protocol
        // and may hold several statements.
        if let Err(e) = (&mut *tx).execute(batch).await {
            return Err(DbError::ExecutionError(e.to_string()));
        }
        tx.commit()
            .await
            .map_err(|e| DbError::ExecutionError(format!("COMMIT failed: {e}")))
    }

    fn date_function(&self) -> &'static str {
        "now"
    }

    fn engine_name(&self) -> &'static str {
        "postgresql"
    }
}
