//! Run command handler
//!
//! Drives the full workflow and maps its outcome to an exit code.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use skiff_workflow::{Config, Workflow, WorkflowOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use super::{EXIT_JOB_UNSUCCESSFUL, connect};

/// Options for `skiff run`
#[derive(Args)]
pub struct RunArgs {
    /// Local directory mounted into the job as its input
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Local directory receiving the results
    #[arg(long)]
    outputs: Option<PathBuf>,

    /// Overall time budget in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Delay between status checks in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

impl RunArgs {
    fn apply(self, config: &mut Config) {
        if let Some(inputs) = self.inputs {
            config.inputs_dir = inputs;
        }
        if let Some(outputs) = self.outputs {
            config.outputs_dir = outputs;
        }
        if let Some(secs) = self.deadline_secs {
            config.deadline = Duration::from_secs(secs);
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
    }
}

/// Handle `skiff run`
pub async fn handle_run(args: RunArgs, mut config: Config) -> Result<ExitCode> {
    args.apply(&mut config);
    config.validate().context("Invalid run options")?;

    let client = connect(&config)?;
    let workflow = Workflow::new(config, Arc::new(client));

    println!("{}", "Submitting job...".bold());
    let outcome = workflow.run().await.context("Job workflow failed")?;

    Ok(report(&outcome))
}

/// Print the outcome and pick the exit code
fn report(outcome: &WorkflowOutcome) -> ExitCode {
    match outcome {
        WorkflowOutcome::Completed { job_id, results } => {
            println!("{} Job {} completed", "✓".green(), job_id.cyan());
            match results {
                Ok(dir) => println!("  Results: {}", dir.display().to_string().bold()),
                Err(e) => println!("  {} {}", "Could not retrieve results:".yellow(), e),
            }
        }
        WorkflowOutcome::Failed {
            job_id,
            message,
            executions,
        } => {
            println!("{} Job {} failed", "✗".red(), job_id.cyan());
            if let Some(message) = message {
                println!("  Reason: {}", message.red());
            }
            for execution in executions {
                if let Some(msg) = execution.message() {
                    println!("  Execution {}: {}", execution.id.dimmed(), msg);
                }
            }
        }
        WorkflowOutcome::Stopped { job_id, message } => {
            println!("{} Job {} was stopped", "■".magenta(), job_id.cyan());
            if let Some(message) = message {
                println!("  Reason: {}", message);
            }
        }
    }

    ExitCode::from(exit_status(outcome))
}

/// Completed jobs exit 0 even when their results could not be retrieved
fn exit_status(outcome: &WorkflowOutcome) -> u8 {
    if outcome.is_success() {
        0
    } else {
        EXIT_JOB_UNSUCCESSFUL
    }
}
