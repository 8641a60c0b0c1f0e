//! Error types for dm-core

use thiserror::Error;

/// Core error type for dbmigrate
#[derive(Error, Debug)]
pub enum CoreError {
    /// M001: Configuration file not found
    #[error("[M001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// M002: Failed to parse configuration file
    #[error("[M002] Failed to parse config {path}: {source}")]
    ConfigParseError {
        path: String,
        source: serde_yaml::Error,
    },

    /// M003: Invalid configuration value
    #[error("[M003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// M004: IO error with file path context
    #[error("[M004] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// M005: Directory entry whose name is not valid UTF-8
    #[error("[M005] Invalid migration filename in {directory}: {name}")]
    InvalidFilename { directory: String, name: String },

    /// M010: Unapplied migrations sort before the latest applied one
    #[error("[M010] [{}] older than the latest performed migration", .files.join(","))]
    OutOfOrder { files: Vec<String> },

    /// M011: Applied migrations whose content changed on disk
    #[error("[M011] [{}] migrations were modified since they were run on this database.", .files.join(","))]
    ModifiedMigration { files: Vec<String> },

    /// M012: Applied migrations no longer present on disk
    #[error("[M012] [{}] migrations were deleted since they were run on this database.", .files.join(","))]
    DeletedMigration { files: Vec<String> },

    /// M020: Script migration exited unsuccessfully or could not be started
    #[error("[M020] Migration script {path} failed: {reason}")]
    ExternalCommand { path: String, reason: String },

    /// M030: Scaffold slug is empty
    #[error("[M030] Invalid migration slug '{slug}': slug must contain at least one non-space character")]
    InvalidSlug { slug: String },

    /// M031: Scaffold target already exists
    #[error("[M031] Migration file already exists: {path}")]
    MigrationFileExists { path: String },
}

impl CoreError {
    /// True for the integrity checks that abort a run before anything executes.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::OutOfOrder { .. }
                | CoreError::ModifiedMigration { .. }
                | CoreError::DeletedMigration { .. }
        )
    }

}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
