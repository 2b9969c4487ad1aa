//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod run;

pub use job::JobCommands;
pub use run::RunArgs;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use skiff_client::OrchestratorClient;
use skiff_core::domain::job::JobStateType;
use skiff_workflow::Config;
use std::process::ExitCode;

/// Exit status for a job that ran but failed or was stopped
pub const EXIT_JOB_UNSUCCESSFUL: u8 = 2;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit the job, wait for it and download its results
    Run(RunArgs),
    /// Individual job operations
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Returns
/// The process exit code for the command
pub async fn handle_command(command: Commands, config: Config) -> Result<ExitCode> {
    match command {
        Commands::Run(args) => run::handle_run(args, config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
    }
}

/// Creates the HTTP client for the configured orchestrator
fn connect(config: &Config) -> Result<OrchestratorClient> {
    OrchestratorClient::with_timeout(&config.orchestrator_url, config.request_timeout)
        .context("Failed to create orchestrator client")
}

/// Colorize a job state for display
fn colorize_state(state: JobStateType) -> ColoredString {
    let state_str = state.to_string();
    match state {
        JobStateType::Undefined | JobStateType::Unknown => state_str.dimmed(),
        JobStateType::Pending | JobStateType::Queued => state_str.yellow(),
        JobStateType::Running => state_str.cyan(),
        JobStateType::Completed => state_str.green(),
        JobStateType::Failed => state_str.red(),
        JobStateType::Stopped => state_str.magenta(),
    }
}
