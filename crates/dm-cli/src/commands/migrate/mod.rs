//! Migrate command implementation

mod execute;

use anyhow::{Context, Result};
use dm_core::{build_plan, reconcile, scan_directory, ExecutionPlan, PlanState};
use dm_db::{DbError, Ledger};

use crate::cli::GlobalArgs;
use crate::commands::common::{self, Settings};
use execute::execute_plan;

/// Result of a migrate run
#[derive(Debug)]
pub(crate) struct MigrateOutcome {
    /// The ledger table was created by this run
    pub new_db: bool,
    pub dry_run: bool,
    pub plan: ExecutionPlan,
}

impl MigrateOutcome {
    /// Text printed to stdout after the run
    pub(crate) fn summary(&self) -> String {
        if self.dry_run && !self.plan.is_empty() {
            return self.plan.render();
        }

        let mut lines: Vec<String> = Vec::new();
        if self.new_db {
            lines.push("Created migrations table".to_string());
        }
        if self.plan.is_empty() {
            lines.push("No unapplied migrations".to_string());
            return lines.join("\n");
        }

        let applied = self.plan.filenames_in(PlanState::Applied);
        if !applied.is_empty() {
            lines.push(format!("Ran {} migrations:", applied.len()));
            lines.extend(applied.iter().map(|f| f.to_string()));
        }
        let ghosts = self.plan.filenames_in(PlanState::Ghost);
        if !ghosts.is_empty() {
            lines.push(format!("Simulated {} migrations:", ghosts.len()));
            lines.extend(ghosts.iter().map(|f| f.to_string()));
        }
        lines.join("\n")
    }
}

/// Bring the ledger's database up to date with the migration directory.
pub(crate) async fn migrate(ledger: &dyn Ledger, settings: &Settings) -> Result<MigrateOutcome> {
    let new_db = if settings.dry_run {
        false
    } else {
        match ledger.create_table().await {
            Ok(()) => {
                log::debug!("Created migrations table");
                true
            }
            Err(DbError::TableExists(_)) => false,
            Err(e) => return Err(e).context("Failed to create migrations table"),
        }
    };

    let applied = match ledger.applied_entries().await {
        Ok(entries) => entries,
        Err(DbError::QueryError(msg)) if settings.dry_run => {
            log::debug!("No migrations table yet ({msg}), treating ledger as empty");
            Vec::new()
        }
        Err(e) => return Err(e).context("Failed to read migrations table"),
    };

    let current = scan_directory(&settings.directory)?;
    log::debug!(
        "{} migrations on disk, {} in ledger",
        current.len(),
        applied.len()
    );

    let reconciliation = reconcile(&current, &applied, settings.out_of_order)?;
    if !reconciliation.out_of_order.is_empty() {
        let warning = format!(
            "Running [{}] out of order.",
            reconciliation.out_of_order.join(",")
        );
        log::info!("{warning}");
        eprintln!("{warning}");
    }

    let mut plan = build_plan(
        &settings.directory,
        &reconciliation.to_run,
        ledger.date_function(),
    )?;

    if !settings.dry_run {
        execute_plan(ledger, &mut plan, new_db, settings).await?;
    }

    Ok(MigrateOutcome {
        new_db,
        dry_run: settings.dry_run,
        plan,
    })
}

/// Execute the migrate command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let settings = Settings::resolve(global)?;
    let ledger = common::connect(&settings).await?;

    let outcome = migrate(ledger.as_ref(), &settings).await?;
    println!("{}", outcome.summary());
    Ok(())
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
