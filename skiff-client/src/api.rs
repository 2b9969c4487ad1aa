//! Orchestration API capability
//!
//! The workflow only needs three operations from the orchestrator. Keeping them
//! behind a trait lets the HTTP client and the in-memory fake be swapped freely.

use async_trait::async_trait;
use skiff_core::domain::job::Job;
use skiff_core::dto::job::{GetJobResponse, ListJobResultsResponse, PutJobResponse};

use crate::error::Result;

/// Jobs endpoints of an orchestration service
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// Submits a job
    ///
    /// # Returns
    /// The submission receipt carrying the job ID used for all later queries
    async fn submit(&self, job: &Job) -> Result<PutJobResponse>;

    /// Fetches a snapshot of a job
    ///
    /// # Arguments
    /// * `job_id` - ID returned by [`JobsApi::submit`]
    /// * `include_executions` - Whether to embed execution records
    async fn get_job(&self, job_id: &str, include_executions: bool) -> Result<GetJobResponse>;

    /// Lists the result items of a completed job
    async fn list_results(&self, job_id: &str) -> Result<ListJobResultsResponse>;
}
