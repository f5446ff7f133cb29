use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("caseflow=debug")
    } else {
        EnvFilter::new("caseflow=warn")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Validate(args) => cli::validate::execute(args),
        Commands::Status(args) => cli::status::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}
