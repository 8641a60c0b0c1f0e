//! Optional settings file for dbmigrate.
//!
//! Every setting can also be given on the command line; the file only supplies
//! values the command line (or `DBMIGRATE_CONNECTION`) left unset. It is never
//! discovered implicitly because the migration directory itself must contain
//! nothing but migrations.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection string used when nothing else is configured
pub const DEFAULT_CONNECTION: &str = "sqlite:///:memory:";

/// Migration directory used when nothing else is configured
pub const DEFAULT_DIRECTORY: &str = ".";

/// Settings loaded from a YAML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Connection string (`<scheme>://[user[:password]@][host[:port]]/<database>`)
    #[serde(default)]
    pub connection: Option<String>,

    /// Directory holding the migration files
    #[serde(default)]
    pub directory: Option<String>,

    /// Allow migrations older than the latest applied one
    #[serde(default)]
    pub out_of_order: Option<bool>,

    /// Run existing migrations when the ledger table was just created
    #[serde(default)]
    pub run_for_new_db: Option<bool>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.connection.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "connection cannot be empty".to_string(),
            });
        }
        if self.directory.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "directory cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
