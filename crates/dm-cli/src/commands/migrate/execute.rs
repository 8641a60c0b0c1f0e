//! Plan execution.
//!
//! Items run strictly in plan order. Each item's body runs first (unless the
//! database was just created and `run_for_new_db` is off, which turns the
//! item into a ghost) and its ledger row is written afterwards. The first
//! failure stops the run; rows written before it stay in the ledger.

use anyhow::{Context, Result};
use dm_core::scaffold::make_executable;
use dm_core::{CoreError, ExecutionPlan, PlanBody, PlanState};
use dm_db::Ledger;
use std::collections::HashMap;
use std::path::Path;

use crate::commands::common::Settings;

/// Environment variable carrying the connection string to script migrations
pub(crate) const CONNECTION_ENV: &str = "DBMIGRATE_CONNECTION";
/// Environment variable carrying the migration directory to script migrations
pub(crate) const DIRECTORY_ENV: &str = "DBMIGRATE_DIRECTORY";

/// Build extra environment variables for script migrations.
fn build_env_vars(settings: &Settings) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert(CONNECTION_ENV.to_string(), settings.connection.clone());
    env.insert(
        DIRECTORY_ENV.to_string(),
        settings.directory.display().to_string(),
    );
    env
}

/// Run a script migration to completion, inheriting stdout and stderr.
async fn run_script(path: &Path, env_vars: &HashMap<String, String>) -> Result<(), CoreError> {
    make_executable(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;

    let status = tokio::process::Command::new(path)
        .envs(env_vars)
        .status()
        .await
        .map_err(|e| CoreError::ExternalCommand {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CoreError::ExternalCommand {
            path: path.display().to_string(),
            reason: status.to_string(),
        })
    }
}

/// Execute every item of `plan`, updating each item's state as it goes.
pub(crate) async fn execute_plan(
    ledger: &dyn Ledger,
    plan: &mut ExecutionPlan,
    new_db: bool,
    settings: &Settings,
) -> Result<()> {
    let ghost_run = new_db && !settings.run_for_new_db;
    let env_vars = build_env_vars(settings);

    for item in &mut plan.items {
        if ghost_run {
            log::debug!("Recording {} without running it", item.filename);
            item.state = PlanState::Ghost;
        } else {
            log::debug!("Running {}", item.filename);
            match &item.body {
                PlanBody::Sql(sql) => ledger
                    .execute(sql)
                    .await
                    .with_context(|| format!("Migration {} failed", item.filename))?,
                PlanBody::Command(path) => run_script(path, &env_vars).await?,
            }
            item.state = PlanState::Applied;
        }

        ledger
            .execute(&item.insert_statement)
            .await
            .with_context(|| format!("Failed to record migration {}", item.filename))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "execute_test.rs"]
mod tests;
