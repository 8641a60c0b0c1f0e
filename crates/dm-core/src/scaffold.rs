//! Scaffolding for new migration files.

use crate::error::{CoreError, CoreResult};
use crate::plan::is_sql_migration;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp prefix format; lexical order of these is chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A migration file that is about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Starter content for a new migration with the given extension.
pub fn template_for(extension: &str) -> &'static str {
    match extension {
        "sql" => "-- add your migration here",
        "py" => "#!/usr/bin/env python\n# add migration here",
        "sh" => "#!/bin/sh\n# add migration here",
        _ => "",
    }
}

/// Work out the path and content of a new migration created at `now`.
///
/// Spaces in the slug become dashes: `add users` at 2024-01-02 03:04:05
/// yields `20240102030405-add-users.sql`.
pub fn scaffold_migration(
    dir: &Path,
    slug: &str,
    extension: &str,
    now: DateTime<Utc>,
) -> CoreResult<ScaffoldedFile> {
    let normalized = slug.split_whitespace().collect::<Vec<_>>().join("-");
    if normalized.is_empty() {
        return Err(CoreError::InvalidSlug {
            slug: slug.to_string(),
        });
    }
    let extension = extension.trim_start_matches('.');
    let filename = format!(
        "{}-{}.{}",
        now.format(TIMESTAMP_FORMAT),
        normalized,
        extension
    );
    Ok(ScaffoldedFile {
        path: dir.join(filename),
        content: template_for(extension).to_string(),
    })
}

impl ScaffoldedFile {
    /// Write the file, refusing to overwrite an existing one.
    ///
    /// Non-SQL migrations run as executables and are created with mode 0755 on unix.
    pub fn write(&self) -> CoreResult<()> {
        let io_err = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                CoreError::MigrationFileExists {
                    path: self.path.display().to_string(),
                }
            } else {
                CoreError::IoWithPath {
                    path: self.path.display().to_string(),
                    source: e,
                }
            }
        };

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(self.content.as_bytes()).map_err(io_err)?;

        if !self.is_sql() {
            make_executable(&self.path).map_err(io_err)?;
        }
        Ok(())
    }

    fn is_sql(&self) -> bool {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_sql_migration)
    }
}

/// Set the executable bits on `path` (no-op off unix).
pub fn make_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(perms.mode() | 0o755);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
