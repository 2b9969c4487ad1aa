//! Job command handlers
//!
//! Handles the individual steps of the workflow: submitting the job,
//! inspecting it, listing its results and downloading them.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use skiff_client::{JobsApi, OrchestratorClient};
use skiff_core::dto::job::GetJobResponse;
use skiff_workflow::{Config, Workflow, builder};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use super::{colorize_state, connect};

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit the job without waiting for it
    Submit {
        /// Local directory mounted into the job as its input
        #[arg(long)]
        inputs: Option<PathBuf>,
    },
    /// Get job details
    Get {
        /// Job ID
        id: String,
    },
    /// List the result items of a job
    Results {
        /// Job ID
        id: String,
    },
    /// Download and extract the results of a completed job
    Download {
        /// Job ID
        id: String,

        /// Local directory receiving the results
        #[arg(long)]
        outputs: Option<PathBuf>,
    },
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
pub async fn handle_job_command(command: JobCommands, mut config: Config) -> Result<ExitCode> {
    match command {
        JobCommands::Submit { inputs } => {
            if let Some(inputs) = inputs {
                config.inputs_dir = inputs;
            }
            submit_job(&connect(&config)?, &config).await?;
        }
        JobCommands::Get { id } => get_job(&connect(&config)?, &id).await?,
        JobCommands::Results { id } => list_results(&connect(&config)?, &id).await?,
        JobCommands::Download { id, outputs } => {
            if let Some(outputs) = outputs {
                config.outputs_dir = outputs;
            }
            download_results(config, &id).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Build and submit the job, printing its ID
async fn submit_job(client: &OrchestratorClient, config: &Config) -> Result<()> {
    let job = builder::build_job(&config.inputs_dir)?;
    let response = client
        .submit(&job)
        .await
        .context("Failed to submit job")?;

    for warning in &response.warnings {
        println!("{} {}", "⚠".yellow(), warning.yellow());
    }

    println!("{}", "✓ Job submitted successfully!".green());
    println!("  ID:         {}", response.job_id.cyan());
    println!("  Evaluation: {}", response.evaluation_id.dimmed());

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &OrchestratorClient, id: &str) -> Result<()> {
    let response = client
        .get_job(id, true)
        .await
        .with_context(|| format!("Failed to get job {}", id))?;

    print_job_details(&response);

    Ok(())
}

/// List result items of a job
async fn list_results(client: &OrchestratorClient, id: &str) -> Result<()> {
    let listing = client
        .list_results(id)
        .await
        .with_context(|| format!("Failed to list results of job {}", id))?;

    if listing.items.is_empty() {
        println!("{}", "No results found for this job.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} result item(s):", listing.items.len()).bold()
    );
    for item in &listing.items {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            item.kind,
            item.download_url().unwrap_or("(no URL)").dimmed()
        );
    }

    Ok(())
}

/// Download and extract the results of a completed job
async fn download_results(config: Config, id: &str) -> Result<()> {
    let client = connect(&config)?;
    let workflow = Workflow::new(config, Arc::new(client));

    let dir = workflow
        .retrieve(id)
        .await
        .with_context(|| format!("Failed to retrieve results of job {}", id))?;

    println!("{}", "✓ Results downloaded".green());
    println!("  Extracted to: {}", dir.display().to_string().bold());

    Ok(())
}

/// Print detailed job information
fn print_job_details(response: &GetJobResponse) {
    let job = &response.job;

    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.as_deref().unwrap_or("-").cyan());
    println!("  Name:      {}", job.name);
    println!("  Namespace: {}", job.namespace.dimmed());
    println!("  State:     {}", colorize_state(job.state_type()));

    if let Some(message) = job.state_message() {
        println!("  Message:   {}", message);
    }

    if let Some(created) = job.created_at() {
        println!("  Created:   {}", created.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(modified) = job.modified_at() {
        println!("  Modified:  {}", modified.format("%Y-%m-%d %H:%M:%S"));
    }

    let executions = response.executions();
    if !executions.is_empty() {
        println!("\n{}", "Executions:".bold());
    }

    for execution in executions {
        println!("  {} {}", "▸".cyan(), execution.id.dimmed());
        println!("    Node:  {}", execution.node_id);
        println!("    State: {}", execution.compute_state.state_type);

        if let Some(message) = execution.message() {
            println!("    Message: {}", message.red());
        }

        if let Some(output) = &execution.run_output {
            println!("    Exit Code: {}", output.exit_code);
            if !output.stdout.is_empty() {
                println!("    Stdout:\n{}", output.stdout);
            }
            if !output.stderr.is_empty() {
                println!("    Stderr:\n{}", output.stderr.red());
            }
        }
    }
}
