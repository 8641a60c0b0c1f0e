//! Rename detection: move ledger rows to the current filename of their content.
//!
//! Files are sometimes renamed (usually to fix ordering) without their content
//! changing. The fingerprint ignores the filename, so the ledger row can be
//! found by hash and pointed at the new name. This must happen before a
//! migrate, otherwise the rename looks like a deletion plus a new migration.

use crate::ledger_sql::rename_statement;
use crate::record::{LedgerEntry, MigrationRecord};
use std::collections::BTreeMap;

/// A ledger row whose file now has a different name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub old_filename: String,
    pub new_filename: String,
    pub content_hash: String,
}

impl Rename {
    /// Statement updating the ledger row for this rename
    pub fn statement(&self) -> String {
        rename_statement(&self.new_filename, &self.content_hash)
    }
}

/// Join the statements of `renames` into one batch, one statement per line.
pub fn rename_batch(renames: &[Rename]) -> String {
    renames
        .iter()
        .map(Rename::statement)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Group filenames by content hash.
fn names_by_hash<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<&'a str, Vec<&'a str>> {
    let mut map: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (hash, filename) in pairs {
        map.entry(hash).or_default().push(filename);
    }
    map
}

/// Find ledger rows whose content is on disk under a different filename.
///
/// Hashes missing from disk and rows whose name already matches are left
/// alone. A hash carried by several files on disk or several ledger rows is
/// ambiguous: the update is keyed by hash and would rewrite every such row, so
/// it is skipped with a warning. Results are sorted by new filename.
pub fn plan_renames(current: &[MigrationRecord], applied: &[LedgerEntry]) -> Vec<Rename> {
    let on_disk = names_by_hash(
        current
            .iter()
            .map(|r| (r.content_hash.as_str(), r.filename.as_str())),
    );
    let in_ledger = names_by_hash(
        applied
            .iter()
            .map(|e| (e.content_hash.as_str(), e.filename.as_str())),
    );

    let mut renames = Vec::new();
    for (hash, ledger_names) in &in_ledger {
        let Some(disk_names) = on_disk.get(hash) else {
            continue;
        };
        if ledger_names.len() > 1 || disk_names.len() > 1 {
            if ledger_names.iter().any(|n| !disk_names.contains(n)) {
                log::warn!(
                    "Skipping rename for content {}: ambiguous between ledger [{}] and files [{}]",
                    hash,
                    ledger_names.join(","),
                    disk_names.join(",")
                );
            }
            continue;
        }
        let (old, new) = (ledger_names[0], disk_names[0]);
        if old != new {
            renames.push(Rename {
                old_filename: old.to_string(),
                new_filename: new.to_string(),
                content_hash: hash.to_string(),
            });
        }
    }

    renames.sort_by(|a, b| a.new_filename.cmp(&b.new_filename));
    renames
}

#[cfg(test)]
#[path = "rename_test.rs"]
mod tests;
