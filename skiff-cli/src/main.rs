//! Skiff CLI
//!
//! Command-line interface for running batch jobs against an orchestrator.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use skiff_workflow::config::DEFAULT_ORCHESTRATOR_URL;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skiff")]
#[command(about = "Submit a batch job, wait for it and fetch its results", long_about = None)]
struct Cli {
    /// Orchestrator URL
    #[arg(
        long,
        env = "SKIFF_ORCHESTRATOR_URL",
        default_value = DEFAULT_ORCHESTRATOR_URL
    )]
    orchestrator_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skiff=info,skiff_workflow=info,skiff_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.orchestrator_url)?;

    handle_command(cli.command, config).await
}
