//! Job DTOs for the orchestration API

use serde::{Deserialize, Serialize};

use crate::domain::execution::Execution;
use crate::domain::job::Job;
use crate::domain::result::ResultItem;

/// Query value asking the service to embed execution records
pub const INCLUDE_EXECUTIONS: &str = "executions";

/// Request to submit (or update) a job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutJobRequest {
    pub job: Job,
}

/// Response to a job submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutJobResponse {
    #[serde(rename = "JobID")]
    pub job_id: String,
    #[serde(rename = "EvaluationID", default)]
    pub evaluation_id: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub warnings: Vec<String>,
}

/// Job snapshot, optionally with its executions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetJobResponse {
    pub job: Job,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executions: Option<ListExecutions>,
}

impl GetJobResponse {
    /// Executions included in the response (empty if not requested)
    pub fn executions(&self) -> &[Execution] {
        self.executions
            .as_ref()
            .map(|e| e.items.as_slice())
            .unwrap_or_default()
    }
}

/// Page of executions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListExecutions {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub items: Vec<Execution>,
}

/// Result set of a completed job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListJobResultsResponse {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub items: Vec<ResultItem>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_token: String,
}
