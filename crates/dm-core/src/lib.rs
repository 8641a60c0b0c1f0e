//! dm-core - Core library for dbmigrate
//!
//! This crate provides the migration record types, the directory scanner and
//! content fingerprinting, the reconciliation engine that turns a directory and
//! a ledger into an ordered execution plan, rename detection, and the
//! scaffolding helper. It performs no database I/O; see `dm-db` for that.

pub mod checksum;
pub mod config;
pub mod error;
pub mod ledger_sql;
pub mod plan;
pub mod reconcile;
pub mod record;
pub mod rename;
pub mod scaffold;
pub mod scanner;

pub use checksum::blob_fingerprint;
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use plan::{build_plan, ExecutionPlan, PlanBody, PlanItem, PlanState};
pub use reconcile::{reconcile, Reconciliation};
pub use record::{LedgerEntry, MigrationRecord};
pub use rename::{plan_renames, rename_batch, Rename};
pub use scaffold::{scaffold_migration, ScaffoldedFile};
pub use scanner::scan_directory;
