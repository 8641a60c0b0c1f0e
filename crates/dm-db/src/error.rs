//! Error types for dm-db

use thiserror::Error;

/// Ledger and connection errors
#[derive(Error, Debug)]
pub enum DbError {
    /// No engine registered for the connection string's scheme (D001)
    #[error("[D001] Unsupported database engine '{scheme}' (supported: {supported})")]
    UnsupportedEngine { scheme: String, supported: String },

    /// Connection string could not be parsed (D002)
    #[error("[D002] Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Connection error (D003)
    #[error("[D003] Database connection failed: {0}")]
    ConnectionError(String),

    /// Ledger table already exists (D004)
    ///
    /// Returned by `create_table`; callers treat it as "not a new database".
    #[error("[D004] Migration table already exists: {0}")]
    TableExists(String),

    /// Reading the ledger failed, usually because the table is missing (D005)
    #[error("[D005] Query failed: {0}")]
    QueryError(String),

    /// A statement batch failed and was rolled back (D006)
    #[error("[D006] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Mutex poisoned (D007)
    #[error("[D007] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

impl DbError {
    /// Errors caused by how the tool was invoked rather than by the database.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            DbError::UnsupportedEngine { .. } | DbError::InvalidConnectionString(_)
        )
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

/// Message fragment every supported engine uses for duplicate tables.
pub(crate) fn says_already_exists(message: &str) -> bool {
    message.contains("already exists")
}
