//! SQL text for the ledger table.
//!
//! The ledger is the `dbmigration` table. Statements that only depend on the
//! migration data (not on the engine) live here so the reconciler and the
//! renamer can render them without a connection; engine-specific DDL lives in
//! the `dm-db` backends.

/// Name of the ledger table
pub const LEDGER_TABLE: &str = "dbmigration";

/// Query returning every ledger row, ordered by filename
pub const SELECT_APPLIED_SQL: &str =
    "SELECT filename, sha1, date FROM dbmigration ORDER BY filename";

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render the `CREATE TABLE` statement for the ledger with the engine's date type.
pub fn create_table_sql(date_type: &str) -> String {
    format!(
        "CREATE TABLE {} (filename varchar(255), sha1 varchar(40), date {});",
        LEDGER_TABLE, date_type
    )
}

/// Render the statement recording an applied migration.
///
/// `date_function` is the engine's current-timestamp function name, called
/// without arguments (e.g. `datetime` renders `datetime()`).
pub fn insert_statement(filename: &str, content_hash: &str, date_function: &str) -> String {
    format!(
        "INSERT INTO {} (filename, sha1, date) VALUES ('{}', '{}', {}());",
        LEDGER_TABLE,
        escape_sql_string(filename),
        escape_sql_string(content_hash),
        date_function
    )
}

/// Render the statement moving a ledger row to a new filename, keyed by content.
pub fn rename_statement(new_filename: &str, content_hash: &str) -> String {
    format!(
        "UPDATE {} SET filename = '{}' WHERE sha1 = '{}';",
        LEDGER_TABLE,
        escape_sql_string(new_filename),
        escape_sql_string(content_hash)
    )
}
