mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use hbs_watch::output::ConsoleReporter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hbs_watch=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { layout } => {
            let config = layout.resolve();
            let reporter = Arc::new(ConsoleReporter::new(layout.json));
            hbs_watch::run(&config, reporter).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Compile { layout } => {
            let config = layout.resolve();
            let reporter = ConsoleReporter::new(layout.json);
            if hbs_watch::compile_once(&config, &reporter).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
