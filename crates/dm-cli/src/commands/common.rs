//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use dm_core::config::{Config, DEFAULT_CONNECTION, DEFAULT_DIRECTORY};
use dm_core::CoreError;
use dm_db::{DbError, EngineRegistry, Ledger};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Runtime, backend or I/O failure
pub(crate) const EXIT_RUNTIME: i32 = 1;
/// Out-of-order, modified or deleted migrations
pub(crate) const EXIT_VALIDATION: i32 = 2;
/// A script migration failed
pub(crate) const EXIT_SCRIPT: i32 = 3;
/// Bad invocation or configuration
pub(crate) const EXIT_USAGE: i32 = 4;

/// Pick the process exit code for an error by walking its cause chain.
///
/// The first `CoreError` or `DbError` found decides; anything else is a
/// runtime failure.
pub(crate) fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            return match core {
                e if e.is_validation() => EXIT_VALIDATION,
                CoreError::ExternalCommand { .. } => EXIT_SCRIPT,
                CoreError::ConfigNotFound { .. }
                | CoreError::ConfigParseError { .. }
                | CoreError::ConfigInvalid { .. }
                | CoreError::InvalidSlug { .. }
                | CoreError::MigrationFileExists { .. } => EXIT_USAGE,
                _ => EXIT_RUNTIME,
            };
        }
        if let Some(db) = cause.downcast_ref::<DbError>() {
            return if db.is_usage() {
                EXIT_USAGE
            } else {
                EXIT_RUNTIME
            };
        }
    }
    EXIT_RUNTIME
}

/// Effective settings after merging flags, environment, config file and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub connection: String,
    pub directory: PathBuf,
    pub out_of_order: bool,
    pub dry_run: bool,
    pub run_for_new_db: bool,
}

impl Settings {
    /// Resolve settings: flag (or `DBMIGRATE_CONNECTION`), then `--config`, then defaults.
    pub(crate) fn resolve(global: &GlobalArgs) -> Result<Self> {
        let config = match &global.config {
            Some(path) => Config::load(Path::new(path))
                .with_context(|| format!("Failed to load settings from {path}"))?,
            None => Config::default(),
        };
        Ok(Self::merge(global, config))
    }

    fn merge(global: &GlobalArgs, config: Config) -> Self {
        let connection = global
            .connection_string
            .clone()
            .or(config.connection)
            .unwrap_or_else(|| DEFAULT_CONNECTION.to_string());
        let directory = global
            .directory
            .clone()
            .or(config.directory)
            .unwrap_or_else(|| DEFAULT_DIRECTORY.to_string());

        Self {
            connection,
            directory: PathBuf::from(directory),
            out_of_order: global
                .out_of_order_flag()
                .or(config.out_of_order)
                .unwrap_or(false),
            dry_run: global.dry_run,
            run_for_new_db: global
                .run_for_new_db
                .or(config.run_for_new_db)
                .unwrap_or(true),
        }
    }
}

/// Open the ledger for the configured connection string.
pub(crate) async fn connect(settings: &Settings) -> Result<Box<dyn Ledger>> {
    let ledger = EngineRegistry::builtin()
        .connect(&settings.connection)
        .await
        .context("Failed to open migration ledger")?;
    log::debug!("Using {} ledger", ledger.engine_name());
    Ok(ledger)
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
