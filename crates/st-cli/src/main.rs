//! Stratum CLI - versioned database migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{drop_table, migrate, new, resolve, status, validate};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match run(&cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::ExitCode::from(*code),
            None => {
                eprintln!("Error: {err:#}");
                std::process::ExitCode::FAILURE
            }
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Migrate(args) => migrate::execute(args, &cli.global),
        Commands::Resolve(args) => resolve::execute(args, &cli.global),
        Commands::Status(args) => status::execute(args, &cli.global),
        Commands::Validate(args) => validate::execute(args, &cli.global),
        Commands::New(args) => new::execute(args, &cli.global),
        Commands::DropTable(args) => drop_table::execute(args, &cli.global),
    }
}

/// `info` by default, `debug` with `--verbose`; `RUST_LOG` wins over both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
