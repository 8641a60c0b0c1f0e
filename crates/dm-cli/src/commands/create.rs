//! Create command implementation

use anyhow::Result;
use chrono::{DateTime, Utc};
use dm_core::scaffold_migration;

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common::Settings;

/// Scaffold a migration stamped with `now`, returning the message to print.
pub(crate) fn create(
    args: &CreateArgs,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<String> {
    let file = scaffold_migration(&settings.directory, &args.slug, &args.extension, now)?;

    if settings.dry_run {
        return Ok(format!(
            "Would create {} with:\n{}",
            file.path.display(),
            file.content
        ));
    }

    file.write()?;
    log::debug!("Wrote {} bytes to {}", file.content.len(), file.path.display());
    Ok(format!("Created {}", file.path.display()))
}

/// Execute the create command
pub async fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let settings = Settings::resolve(global)?;
    println!("{}", create(args, &settings, Utc::now())?);
    Ok(())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
