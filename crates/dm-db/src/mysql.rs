//! MySQL ledger backend
//!
//! MySQL commits implicitly around DDL, so a batch containing `CREATE` or
//! `ALTER` statements is only partially rolled back on failure.

use crate::connection::ConnectionInfo;
use crate::error::{DbError, DbResult};
use crate::traits::Ledger;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use dm_core::ledger_sql::{create_table_sql, SELECT_APPLIED_SQL};
use dm_core::LedgerEntry;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Executor, Row};
use tokio::sync::Mutex;

/// SQLSTATE for `ER_TABLE_EXISTS_ERROR`
const TABLE_EXISTS: &str = "42S01";

/// MySQL ledger over a single connection
pub struct MySqlLedger {
    conn: Mutex<MySqlConnection>,
}

fn map_error(err: sqlx::Error, fallback: fn(String) -> DbError) -> DbError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(TABLE_EXISTS) => {
            DbError::TableExists(db.message().to_string())
        }
        _ => fallback(err.to_string()),
    }
}

pub(crate) fn connect_options(info: &ConnectionInfo) -> DbResult<MySqlConnectOptions> {
    if info.database.is_empty() {
        return Err(DbError::InvalidConnectionString(
            "mysql connection string needs a database name, e.g. mysql://user@host/app"
                .to_string(),
        ));
    }
    let mut options = MySqlConnectOptions::new().database(&info.database);
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
    Ok(options)
}

impl MySqlLedger {
    /// Connect to the server named by a parsed connection string
    pub async fn connect(info: &ConnectionInfo) -> DbResult<Self> {
        let options = connect_options(info)?;
        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| DbError::ConnectionError(format!("{e}: {info}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl Ledger for MySqlLedger {
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
        "mysql"
    }
}
