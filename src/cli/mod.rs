pub mod run;
pub mod schema;
pub mod status;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caseflow")]
#[command(
    author,
    version,
    about = "Clarify, plan, execute and review case-management requests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a session script and execute its plan
    Run(RunArgs),

    /// Check a session script's answers and plan without executing
    Validate(ValidateArgs),

    /// Show the last saved workflow snapshot
    Status(StatusArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Session script (YAML)
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,

    /// Path to config file
    #[arg(short, long, default_value = "caseflow.yaml", env = "CASEFLOW_CONFIG")]
    pub config: PathBuf,

    /// Override output directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Show execution order without running any task
    #[arg(long)]
    pub dry_run: bool,

    /// Exit 1 unless every task succeeded (CI mode)
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(Parser, Clone)]
pub struct ValidateArgs {
    /// Session script (YAML)
    #[arg(value_name = "SESSION")]
    pub session: PathBuf,
}

#[derive(Parser, Clone)]
pub struct StatusArgs {
    /// Path to config file
    #[arg(short, long, default_value = "caseflow.yaml", env = "CASEFLOW_CONFIG")]
    pub config: PathBuf,
}
