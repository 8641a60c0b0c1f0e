//! CLI argument definitions using clap derive API

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

/// dbmigrate - apply timestamp-ordered SQL and script migrations
#[derive(Parser, Debug)]
#[command(name = "dbmigrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Allow migrations older than the latest applied one
    #[arg(short, long, global = true, overrides_with = "no_out_of_order")]
    pub out_of_order: bool,

    /// Reject out-of-order migrations even if the config file allows them
    #[arg(long, global = true, overrides_with = "out_of_order")]
    pub no_out_of_order: bool,

    /// Print what would happen without changing anything
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Database connection string [default: sqlite:///:memory:]
    #[arg(
        short,
        long,
        global = true,
        env = "DBMIGRATE_CONNECTION",
        value_name = "URL"
    )]
    pub connection_string: Option<String>,

    /// Directory holding the migration files [default: .]
    #[arg(short, long, global = true, value_name = "DIR")]
    pub directory: Option<String>,

    /// Run existing migrations when the migrations table is created [default: true]
    #[arg(
        short,
        long,
        global = true,
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub run_for_new_db: Option<bool>,

    /// Read unset options from a YAML settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Out-of-order setting given on the command line, if any
    pub fn out_of_order_flag(&self) -> Option<bool> {
        if self.out_of_order {
            Some(true)
        } else if self.no_out_of_order {
            Some(false)
        } else {
            None
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply unapplied migrations
    Migrate,

    /// Repair ledger filenames for migrations renamed on disk
    Renamed,

    /// Scaffold a new migration file
    Create(CreateArgs),
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Short description used in the filename; spaces become dashes
    pub slug: String,

    /// File extension (`sql`, or a script type such as `py` or `sh`)
    #[arg(default_value = "sql")]
    pub extension: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
