//! Reconciliation of the migration directory against the ledger.
//!
//! Computes which migrations still need to run and enforces the integrity
//! rules, in a fixed order, before anything is executed:
//!
//! 1. out-of-order check (fatal unless allowed, in which case it is reported)
//! 2. modified check: an applied filename reappears with different content
//! 3. deleted check: an applied filename is gone from disk
//!
//! Every ordering decision is a plain string comparison of filenames, which are
//! timestamp-prefixed so that lexical order is chronological order.

use crate::error::{CoreError, CoreResult};
use crate::record::{LedgerEntry, MigrationRecord};
use std::collections::{BTreeSet, HashSet};

/// Outcome of a successful reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Migrations not yet in the ledger, sorted by filename
    pub to_run: Vec<MigrationRecord>,

    /// Pending filenames older than the latest applied one.
    ///
    /// Only non-empty when out-of-order runs were allowed.
    pub out_of_order: Vec<String>,
}

/// Diff `current` against `applied` and validate the result.
///
/// A record counts as already run only when an identical `(filename, hash)`
/// pair exists in the ledger.
pub fn reconcile(
    current: &[MigrationRecord],
    applied: &[LedgerEntry],
    out_of_order_allowed: bool,
) -> CoreResult<Reconciliation> {
    let applied_pairs: HashSet<(&str, &str)> = applied
        .iter()
        .map(|e| (e.filename.as_str(), e.content_hash.as_str()))
        .collect();

    let mut to_run: Vec<MigrationRecord> = current
        .iter()
        .filter(|r| !applied_pairs.contains(&(r.filename.as_str(), r.content_hash.as_str())))
        .cloned()
        .collect();
    to_run.sort();

    let out_of_order = out_of_order_files(&to_run, applied);
    if !out_of_order.is_empty() && !out_of_order_allowed {
        return Err(CoreError::OutOfOrder {
            files: out_of_order,
        });
    }

    let modified = modified_files(&to_run, applied);
    if !modified.is_empty() {
        return Err(CoreError::ModifiedMigration { files: modified });
    }

    let deleted = deleted_files(current, &to_run, applied);
    if !deleted.is_empty() {
        return Err(CoreError::DeletedMigration { files: deleted });
    }

    Ok(Reconciliation {
        to_run,
        out_of_order,
    })
}

/// Pending filenames that sort before the latest applied filename, in `to_run` order.
fn out_of_order_files(to_run: &[MigrationRecord], applied: &[LedgerEntry]) -> Vec<String> {
    let Some(latest) = applied.iter().map(|e| e.filename.as_str()).max() else {
        return Vec::new();
    };
    to_run
        .iter()
        .filter(|r| r.filename.as_str() < latest)
        .map(|r| r.filename.clone())
        .collect()
}

/// Pending filenames that are also applied filenames.
///
/// The pair comparison already excluded exact matches, so a hit means the
/// content on disk no longer matches what was recorded.
fn modified_files(to_run: &[MigrationRecord], applied: &[LedgerEntry]) -> Vec<String> {
    let applied_names: HashSet<&str> = applied.iter().map(|e| e.filename.as_str()).collect();
    to_run
        .iter()
        .map(|r| r.filename.as_str())
        .filter(|name| applied_names.contains(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Ledger-referenced (or pending) filenames missing from disk.
fn deleted_files(
    current: &[MigrationRecord],
    to_run: &[MigrationRecord],
    applied: &[LedgerEntry],
) -> Vec<String> {
    let on_disk: HashSet<&str> = current.iter().map(|r| r.filename.as_str()).collect();
    applied
        .iter()
        .map(|e| e.filename.as_str())
        .chain(to_run.iter().map(|r| r.filename.as_str()))
        .filter(|name| !on_disk.contains(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
