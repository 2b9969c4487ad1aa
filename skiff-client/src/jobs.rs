//! Job-related API endpoints

use async_trait::async_trait;
use skiff_core::domain::job::Job;
use skiff_core::dto::job::{
    GetJobResponse, INCLUDE_EXECUTIONS, ListJobResultsResponse, PutJobRequest, PutJobResponse,
};
use tracing::debug;

use crate::OrchestratorClient;
use crate::api::JobsApi;
use crate::error::{ClientError, Result};

impl OrchestratorClient {
    fn jobs_url(&self) -> String {
        format!("{}/api/v1/orchestrator/jobs", self.base_url)
    }

    fn job_url(&self, job_id: &str) -> Result<String> {
        if job_id.is_empty() {
            return Err(ClientError::InvalidRequest("job ID is empty".to_string()));
        }
        Ok(format!("{}/{}", self.jobs_url(), job_id))
    }
}

#[async_trait]
impl JobsApi for OrchestratorClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    async fn submit(&self, job: &Job) -> Result<PutJobResponse> {
        let url = self.jobs_url();
        debug!("Submitting job '{}' to {}", job.name, url);

        let response = self
            .client
            .put(&url)
            .json(&PutJobRequest { job: job.clone() })
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn get_job(&self, job_id: &str, include_executions: bool) -> Result<GetJobResponse> {
        let url = self.job_url(job_id)?;
        let mut request = self.client.get(&url);
        if include_executions {
            request = request.query(&[("include", INCLUDE_EXECUTIONS)]);
        }

        let response = request.send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Job Results
    // =============================================================================

    async fn list_results(&self, job_id: &str) -> Result<ListJobResultsResponse> {
        let url = format!("{}/results", self.job_url(job_id)?);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
