use super::*;
use dm_core::CoreError;
use dm_db::SqliteLedger;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const CREATE_USER_TABLE: &str = "20120115075349-create-user-table.sql";
const CREATE_USERS: &str = "-- intentionally making this imperfect so it can be migrated
CREATE TABLE users (
  id int PRIMARY KEY,
  name varchar(255),
  password_sha1 varchar(40)
);
";
const CREATE_USERS_HASH: &str = "2622eab9b1efe1277d1796dae0b0ea0f45d8da4a";

fn settings_for(dir: &Path) -> Settings {
    Settings {
        connection: "sqlite:///:memory:".to_string(),
        directory: dir.to_path_buf(),
        out_of_order: false,
        dry_run: false,
        run_for_new_db: true,
    }
}

fn migrations_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

async fn ledger_filenames(ledger: &SqliteLedger) -> Vec<String> {
    ledger
        .applied_entries()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.filename)
        .collect()
}

fn core_error(err: &anyhow::Error) -> &CoreError {
    err.downcast_ref::<CoreError>()
        .unwrap_or_else(|| panic!("expected CoreError, got {err:#}"))
}

#[tokio::test]
async fn test_dry_run_prints_plan_without_writing() {
    let dir = migrations_dir(&[(CREATE_USER_TABLE, CREATE_USERS)]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let settings = Settings {
        dry_run: true,
        ..settings_for(dir.path())
    };

    let outcome = migrate(&ledger, &settings).await.unwrap();

    assert_eq!(
        outcome.summary(),
        format!(
            "sql: {}\nmigration info: INSERT INTO dbmigration (filename, sha1, date) VALUES ('{}', '{}', datetime());",
            CREATE_USERS.trim_end(),
            CREATE_USER_TABLE,
            CREATE_USERS_HASH
        )
    );
    // Not even the ledger table was created.
    assert!(matches!(
        ledger.applied_entries().await,
        Err(DbError::QueryError(_))
    ));
}

#[tokio::test]
async fn test_dry_run_with_nothing_pending() {
    let dir = migrations_dir(&[]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let settings = Settings {
        dry_run: true,
        ..settings_for(dir.path())
    };

    let outcome = migrate(&ledger, &settings).await.unwrap();
    assert_eq!(outcome.summary(), "No unapplied migrations");
}

#[tokio::test]
async fn test_first_run_creates_table_and_applies() {
    let dir = migrations_dir(&[(CREATE_USER_TABLE, CREATE_USERS)]);
    let ledger = SqliteLedger::in_memory().await.unwrap();

    let outcome = migrate(&ledger, &settings_for(dir.path())).await.unwrap();

    assert_eq!(
        outcome.summary(),
        format!("Created migrations table\nRan 1 migrations:\n{CREATE_USER_TABLE}")
    );
    ledger.execute("SELECT id FROM users").await.unwrap();

    let entries = ledger.applied_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].filename, CREATE_USER_TABLE);
    assert_eq!(entries[0].content_hash, CREATE_USERS_HASH);
    assert!(entries[0].applied_at.is_some());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = migrations_dir(&[(CREATE_USER_TABLE, CREATE_USERS)]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let settings = settings_for(dir.path());

    migrate(&ledger, &settings).await.unwrap();
    let outcome = migrate(&ledger, &settings).await.unwrap();

    assert!(!outcome.new_db);
    assert_eq!(outcome.summary(), "No unapplied migrations");
    assert_eq!(ledger_filenames(&ledger).await, vec![CREATE_USER_TABLE]);
}

#[tokio::test]
async fn test_applies_in_filename_order() {
    let dir = migrations_dir(&[
        (
            "20120116000000-add-email.sql",
            "ALTER TABLE users ADD COLUMN email varchar(70);\n",
        ),
        (CREATE_USER_TABLE, CREATE_USERS),
    ]);
    let ledger = SqliteLedger::in_memory().await.unwrap();

    let outcome = migrate(&ledger, &settings_for(dir.path())).await.unwrap();

    assert_eq!(
        outcome.plan.filenames_in(PlanState::Applied),
        vec![CREATE_USER_TABLE, "20120116000000-add-email.sql"]
    );
    ledger.execute("SELECT email FROM users").await.unwrap();
}

#[tokio::test]
async fn test_modified_migration_is_rejected() {
    let dir = migrations_dir(&[(CREATE_USER_TABLE, CREATE_USERS)]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let settings = settings_for(dir.path());
    migrate(&ledger, &settings).await.unwrap();

    std::fs::write(
        dir.path().join(CREATE_USER_TABLE),
        "CREATE TABLE tampered (id int);\n",
    )
    .unwrap();
    let err = migrate(&ledger, &settings).await.unwrap_err();

    match core_error(&err) {
        CoreError::ModifiedMigration { files } => assert_eq!(files, &vec![CREATE_USER_TABLE]),
        other => panic!("expected ModifiedMigration, got {other:?}"),
    }
    // Nothing ran.
    assert!(ledger.execute("SELECT id FROM tampered").await.is_err());
    assert_eq!(ledger_filenames(&ledger).await, vec![CREATE_USER_TABLE]);
}

#[tokio::test]
async fn test_deleted_migration_is_rejected() {
    let dir = migrations_dir(&[
        (CREATE_USER_TABLE, CREATE_USERS),
        (
            "20120116000000-add-email.sql",
            "ALTER TABLE users ADD COLUMN email varchar(70);\n",
        ),
    ]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let settings = settings_for(dir.path());
    migrate(&ledger, &settings).await.unwrap();

    std::fs::remove_file(dir.path().join("20120116000000-add-email.sql")).unwrap();
    let err = migrate(&ledger, &settings).await.unwrap_err();

    match core_error(&err) {
        CoreError::DeletedMigration { files } => {
            assert_eq!(files, &vec!["20120116000000-add-email.sql"])
        }
        other => panic!("expected DeletedMigration, got {other:?}"),
    }
}

#[tokio::test]
async fn test_out_of_order_requires_flag() {
    let dir = migrations_dir(&[("20130101000000-later.sql", "CREATE TABLE later (id int);\n")]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let settings = settings_for(dir.path());
    migrate(&ledger, &settings).await.unwrap();

    std::fs::write(
        dir.path().join("20120101000000-earlier.sql"),
        "CREATE TABLE earlier (id int);\n",
    )
    .unwrap();

    let err = migrate(&ledger, &settings).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "[M010] [20120101000000-earlier.sql] older than the latest performed migration"
    );
    assert!(ledger.execute("SELECT id FROM earlier").await.is_err());

    let allowed = Settings {
        out_of_order: true,
        ..settings_for(dir.path())
    };
    let outcome = migrate(&ledger, &allowed).await.unwrap();
    assert_eq!(
        outcome.summary(),
        "Ran 1 migrations:\n20120101000000-earlier.sql"
    );
    assert_eq!(
        ledger_filenames(&ledger).await,
        vec!["20120101000000-earlier.sql", "20130101000000-later.sql"]
    );
}

#[tokio::test]
async fn test_new_db_without_run_for_new_db_records_ghosts() {
    let dir = migrations_dir(&[(CREATE_USER_TABLE, CREATE_USERS)]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let settings = Settings {
        run_for_new_db: false,
        ..settings_for(dir.path())
    };

    let outcome = migrate(&ledger, &settings).await.unwrap();
    assert_eq!(
        outcome.summary(),
        format!("Created migrations table\nSimulated 1 migrations:\n{CREATE_USER_TABLE}")
    );
    assert!(ledger.execute("SELECT id FROM users").await.is_err());

    let outcome = migrate(&ledger, &settings).await.unwrap();
    assert_eq!(outcome.summary(), "No unapplied migrations");
}

#[tokio::test]
async fn test_run_for_new_db_only_matters_for_new_databases() {
    let dir = migrations_dir(&[(CREATE_USER_TABLE, CREATE_USERS)]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    ledger.create_table().await.unwrap();

    let settings = Settings {
        run_for_new_db: false,
        ..settings_for(dir.path())
    };
    let outcome = migrate(&ledger, &settings).await.unwrap();

    assert!(!outcome.new_db);
    assert_eq!(
        outcome.summary(),
        format!("Ran 1 migrations:\n{CREATE_USER_TABLE}")
    );
}

#[tokio::test]
async fn test_failed_sql_keeps_earlier_migrations() {
    let dir = migrations_dir(&[
        (CREATE_USER_TABLE, CREATE_USERS),
        ("20120116000000-broken.sql", "ALTER TABLE nope ADD COLUMN x int;\n"),
    ]);
    let ledger = SqliteLedger::in_memory().await.unwrap();

    let err = migrate(&ledger, &settings_for(dir.path()))
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("20120116000000-broken.sql"));
    assert!(matches!(
        err.downcast_ref::<DbError>(),
        Some(DbError::ExecutionError(_))
    ));
    assert_eq!(ledger_filenames(&ledger).await, vec![CREATE_USER_TABLE]);
}

#[tokio::test]
async fn test_missing_directory_is_io_error() {
    let ledger = SqliteLedger::in_memory().await.unwrap();
    let err = migrate(&ledger, &settings_for(Path::new("/nonexistent/migrations")))
        .await
        .unwrap_err();
    assert!(matches!(core_error(&err), CoreError::IoWithPath { .. }));
}

#[tokio::test]
async fn test_dry_run_ignores_foreign_ledger_dates() {
    let dir = migrations_dir(&[(CREATE_USER_TABLE, CREATE_USERS)]);
    let ledger = SqliteLedger::in_memory().await.unwrap();
    ledger.create_table().await.unwrap();
    ledger
        .execute(&format!(
            "INSERT INTO dbmigration (filename, sha1, date) VALUES ('{CREATE_USER_TABLE}', '{CREATE_USERS_HASH}', 1700000000);"
        ))
        .await
        .unwrap();

    let settings = Settings {
        dry_run: true,
        ..settings_for(dir.path())
    };
    let outcome = migrate(&ledger, &settings).await.unwrap();
    assert_eq!(outcome.summary(), "No unapplied migrations");

    let outcome = migrate(&ledger, &settings_for(dir.path())).await.unwrap();
    assert_eq!(outcome.summary(), "No unapplied migrations");
}
