//! Renamed command implementation
//!
//! Points ledger rows at the current filename of their content so a renamed
//! migration is not mistaken for a deleted one plus a new one.

use anyhow::{Context, Result};
use dm_core::{plan_renames, rename_batch, scan_directory, Rename};
use dm_db::Ledger;

use crate::cli::GlobalArgs;
use crate::commands::common::{self, Settings};

/// Result of a renamed run
#[derive(Debug)]
pub(crate) struct RenameOutcome {
    pub dry_run: bool,
    pub renames: Vec<Rename>,
}

impl RenameOutcome {
    pub(crate) fn summary(&self) -> String {
        if self.renames.is_empty() {
            return "No renamed migrations".to_string();
        }
        if self.dry_run {
            return rename_batch(&self.renames);
        }
        let mut lines = vec![format!("Renamed {} migrations:", self.renames.len())];
        lines.extend(
            self.renames
                .iter()
                .map(|r| format!("{} -> {}", r.old_filename, r.new_filename)),
        );
        lines.join("\n")
    }
}

/// Detect renamed migrations and, unless dry-running, update the ledger.
pub(crate) async fn renamed(ledger: &dyn Ledger, settings: &Settings) -> Result<RenameOutcome> {
    let applied = ledger
        .applied_entries()
        .await
        .context("Failed to read migrations table")?;
    let current = scan_directory(&settings.directory)?;

    let renames = plan_renames(&current, &applied);
    for rename in &renames {
        log::debug!("{} -> {}", rename.old_filename, rename.new_filename);
    }

    if !settings.dry_run && !renames.is_empty() {
        ledger
            .execute(&rename_batch(&renames))
            .await
            .context("Failed to update renamed migrations")?;
    }

    Ok(RenameOutcome {
        dry_run: settings.dry_run,
        renames,
    })
}

/// Execute the renamed command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let settings = Settings::resolve(global)?;
    let ledger = common::connect(&settings).await?;

    let outcome = renamed(ledger.as_ref(), &settings).await?;
    println!("{}", outcome.summary());
    Ok(())
}

#[cfg(test)]
#[path = "renamed_test.rs"]
mod tests;
