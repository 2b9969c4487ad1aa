//! Workflow driver
//!
//! Runs one job end to end: build the descriptor, submit it, poll until it is
//! terminal and, if it completed, retrieve its results. A single deadline,
//! taken when the run starts, bounds every network call and every sleep.

use skiff_client::JobsApi;
use skiff_core::domain::execution::Execution;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::{self, Instant};
use tracing::{error, info, warn};

use crate::builder;
use crate::config::Config;
use crate::error::{Result, WorkflowError};
use crate::scheduler::{LifecyclePoller, TerminalState};
use crate::service::ResultRetriever;

/// How a job run ended
///
/// Failed and stopped jobs are outcomes, not errors. Result retrieval errors
/// are attached to the completed outcome since the job itself succeeded.
#[derive(Debug)]
pub enum WorkflowOutcome {
    Completed {
        job_id: String,
        /// Extraction directory, or why the results could not be retrieved
        results: Result<PathBuf>,
    },
    Failed {
        job_id: String,
        message: Option<String>,
        executions: Vec<Execution>,
    },
    Stopped {
        job_id: String,
        message: Option<String>,
    },
}

impl WorkflowOutcome {
    /// Whether the job completed (regardless of result retrieval)
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowOutcome::Completed { .. })
    }
}

/// Sequential job lifecycle workflow
pub struct Workflow {
    config: Config,
    api: Arc<dyn JobsApi>,
    retriever: ResultRetriever,
}

impl Workflow {
    /// Creates a workflow writing results under `config.outputs_dir`
    pub fn new(config: Config, api: Arc<dyn JobsApi>) -> Self {
        let retriever = ResultRetriever::new(config.outputs_dir.clone());
        Self {
            config,
            api,
            retriever,
        }
    }

    /// Runs the full lifecycle for one job
    ///
    /// # Errors
    /// Local environment faults, submission and query failures, and the
    /// deadline elapsing before a terminal state are errors. Everything after
    /// a terminal state is observed is reported through the outcome.
    pub async fn run(&self) -> Result<WorkflowOutcome> {
        let deadline = Instant::now() + self.config.deadline;

        let job = builder::build_job(&self.config.inputs_dir)?;
        info!("Submitting job {}", job.name);

        let response = time::timeout_at(deadline, self.api.submit(&job))
            .await
            .map_err(|_| WorkflowError::TimedOut)?
            .map_err(WorkflowError::Submission)?;

        for warning in &response.warnings {
            warn!("Submission warning: {}", warning);
        }

        let job_id = response.job_id;
        info!("Job submitted successfully! ID: {}", job_id);

        let poller = LifecyclePoller::new(self.api.as_ref(), &self.config, deadline);
        let status = poller.wait_for_terminal(&job_id).await?;
        let message = status.message();

        let outcome = match status.state {
            TerminalState::Completed => {
                info!("Job {} completed successfully", job_id);

                let results = self.retrieve_until(&job_id, deadline).await;
                if let Err(e) = &results {
                    error!("Failed to retrieve results for job {}: {}", job_id, e);
                }

                WorkflowOutcome::Completed { job_id, results }
            }
            TerminalState::Failed => {
                error!(
                    "Job {} failed: {}",
                    job_id,
                    message.as_deref().unwrap_or("no message")
                );

                WorkflowOutcome::Failed {
                    job_id,
                    message,
                    executions: status.snapshot.executions().to_vec(),
                }
            }
            TerminalState::Stopped => {
                warn!("Job {} was stopped", job_id);
                WorkflowOutcome::Stopped { job_id, message }
            }
        };

        Ok(outcome)
    }

    /// Retrieves the results of an already completed job
    ///
    /// Bounded by a fresh deadline of `config.deadline`.
    pub async fn retrieve(&self, job_id: &str) -> Result<PathBuf> {
        let deadline = Instant::now() + self.config.deadline;
        self.retrieve_until(job_id, deadline).await
    }

    async fn retrieve_until(&self, job_id: &str, deadline: Instant) -> Result<PathBuf> {
        let retrieval = self.retriever.retrieve(self.api.as_ref(), job_id, deadline);
        time::timeout_at(deadline, retrieval)
            .await
            .map_err(|_| WorkflowError::TimedOut)?
    }
}
