//! dbmigrate CLI - apply timestamp-ordered SQL and script migrations

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::{exit_code_for, EXIT_USAGE};
use commands::{create, migrate, renamed};

/// Install the logger: warnings by default, debug output from our crates with
/// `--verbose`. `RUST_LOG` takes precedence over both.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,dbmigrate=debug,dm_core=debug,dm_db=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap exits with 2 on its own; keep 2 for failed integrity checks.
            let code = if err.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Migrate => migrate::execute(&cli.global).await,
        cli::Commands::Renamed => renamed::execute(&cli.global).await,
        cli::Commands::Create(args) => create::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(exit_code_for(&err));
    }
}
