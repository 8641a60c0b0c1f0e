//! Source scanner: list migration files and fingerprint them.

use crate::checksum::blob_fingerprint;
use crate::error::{CoreError, CoreResult};
use crate::record::MigrationRecord;
use std::path::Path;

/// List the migrations in `dir` with their content fingerprints.
///
/// Only direct entries are considered. Hidden entries (leading `.`) and
/// subdirectories are skipped. Any unreadable file fails the whole scan so a
/// partial view of the directory can never reach the reconciler. The result is
/// sorted by filename.
pub fn scan_directory(dir: &Path) -> CoreResult<Vec<MigrationRecord>> {
    let io_err = |e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    };

    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();

        let filename = entry
            .file_name()
            .into_string()
            .map_err(|raw| CoreError::InvalidFilename {
                directory: dir.display().to_string(),
                name: raw.to_string_lossy().into_owned(),
            })?;
        if filename.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            log::debug!("Skipping subdirectory {}", path.display());
            continue;
        }

        let content = std::fs::read(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        records.push(MigrationRecord::new(filename, blob_fingerprint(&content)));
    }

    records.sort();
    log::debug!("Found {} migration files in {}", records.len(), dir.display());
    Ok(records)
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod tests;
