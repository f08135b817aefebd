//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stratum - versioned database migrations
#[derive(Parser, Debug)]
#[command(name = "stratum")]
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
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".", env = "STRATUM_PROJECT_DIR")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations in version order
    Migrate(MigrateArgs),

    /// List discovered migrations without touching the database
    Resolve(ResolveArgs),

    /// Show applied and pending migrations
    Status(StatusArgs),

    /// Exit non-zero when migrations are pending
    Validate(ValidateArgs),

    /// Create a new timestamped migration script
    New(NewArgs),

    /// Drop the tracking table
    DropTable(DropTableArgs),
}

/// Output formats shared by reporting commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document on stdout
    Json,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Only set the exit code, print nothing
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Short description used in the file name, e.g. "add users table"
    pub name: String,

    /// Directory to write into instead of the first configured location
    #[arg(short, long)]
    pub dir: Option<String>,
}

/// Arguments for the drop-table command
#[derive(Args, Debug)]
pub struct DropTableArgs {
    /// Confirm dropping the tracking table
    #[arg(long)]
    pub yes: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
