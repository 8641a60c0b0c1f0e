use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn test_in_memory() {
    let ledger = DuckDbLedger::in_memory().unwrap();
    assert_eq!(ledger.engine_name(), "duckdb");
    assert_eq!(ledger.date_function(), "now");
}

#[tokio::test]
async fn test_create_table_twice_reports_exists() {
    let ledger = DuckDbLedger::in_memory().unwrap();
    ledger.create_table().await.unwrap();

    let err = ledger.create_table().await.unwrap_err();
    assert!(matches!(err, DbError::TableExists(_)), "got {err:?}");
}

#[tokio::test]
async fn test_applied_entries_without_table_is_query_error() {
    let ledger = DuckDbLedger::in_memory().unwrap();
    let err = ledger.applied_entries().await.unwrap_err();
    assert!(matches!(err, DbError::QueryError(_)), "got {err:?}");
}

#[tokio::test]
async fn test_insert_and_read_back() {
    let ledger = DuckDbLedger::in_memory().unwrap();
    ledger.create_table().await.unwrap();
    ledger
        .execute(
            "INSERT INTO dbmigration (filename, sha1, date) VALUES ('002-b.sql', 'bb', now());
             INSERT INTO dbmigration (filename, sha1, date) VALUES ('001-a.sql', 'aa', now());",
        )
        .await
        .unwrap();

    let entries = ledger.applied_entries().await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.filename.as_str()).collect();
    assert_eq!(names, vec!["001-a.sql", "002-b.sql"]);
    assert!(entries.iter().all(|e| e.applied_at.is_some()));
}

#[tokio::test]
async fn test_failed_batch_is_rolled_back() {
    let ledger = DuckDbLedger::in_memory().unwrap();
    ledger.create_table().await.unwrap();

    let err = ledger
        .execute(
            "INSERT INTO dbmigration (filename, sha1, date) VALUES ('001.sql', 'aa', now());
             INSERT INTO no_such_table VALUES (1);",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)), "got {err:?}");
    assert!(ledger.applied_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connect_file_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.duckdb");
    let info = ConnectionInfo::parse(&format!("duckdb:///{}", path.display())).unwrap();

    let ledger = DuckDbLedger::connect(&info).unwrap();
    ledger.create_table().await.unwrap();
    assert!(path.exists());
}
