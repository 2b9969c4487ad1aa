//! In-memory jobs API
//!
//! A scripted stand-in for the orchestrator. Submitted jobs are recorded, status
//! queries replay a configured sequence of states, and result listings return a
//! configured set of items. Used to exercise the workflow without a network.

use async_trait::async_trait;
use skiff_core::domain::job::{Job, JobState, JobStateType};
use skiff_core::domain::result::ResultItem;
use skiff_core::dto::job::{GetJobResponse, ListJobResultsResponse, PutJobResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::JobsApi;
use crate::error::{ClientError, Result};

/// Scripted in-memory implementation of [`JobsApi`]
///
/// Each `get_job` call consumes the next scripted state; once a single state
/// remains it is returned for every further call.
pub struct InMemoryJobsApi {
    job_id: String,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    submitted: Vec<Job>,
    states: VecDeque<JobState>,
    results: Vec<ResultItem>,
    submit_error: Option<(u16, String)>,
    results_error: Option<(u16, String)>,
    get_job_calls: usize,
    list_results_calls: usize,
}

impl InMemoryJobsApi {
    /// Creates an API that assigns `job_id` to the first submitted job
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Scripts the state tags returned by successive `get_job` calls
    pub fn with_states(self, states: impl IntoIterator<Item = JobStateType>) -> Self {
        self.with_state_messages(states.into_iter().map(|s| (s, String::new())))
    }

    /// Scripts state tags together with their messages
    pub fn with_state_messages(
        self,
        states: impl IntoIterator<Item = (JobStateType, String)>,
    ) -> Self {
        self.lock().states = states
            .into_iter()
            .map(|(state_type, message)| JobState {
                state_type,
                message,
            })
            .collect();
        self
    }

    /// Sets the items returned by `list_results`
    pub fn with_results(self, items: Vec<ResultItem>) -> Self {
        self.lock().results = items;
        self
    }

    /// Makes `submit` fail with the given status
    pub fn reject_submissions(self, status: u16, message: impl Into<String>) -> Self {
        self.lock().submit_error = Some((status, message.into()));
        self
    }

    /// Makes `list_results` fail with the given status
    pub fn fail_results(self, status: u16, message: impl Into<String>) -> Self {
        self.lock().results_error = Some((status, message.into()));
        self
    }

    /// Jobs received by `submit`, in order
    pub fn submitted_jobs(&self) -> Vec<Job> {
        self.lock().submitted.clone()
    }

    /// Number of `get_job` calls served so far
    pub fn get_job_calls(&self) -> usize {
        self.lock().get_job_calls
    }

    /// Number of `list_results` calls served so far
    pub fn list_results_calls(&self) -> usize {
        self.lock().list_results_calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test thread panicked mid-call.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_id(&self, job_id: &str) -> Result<()> {
        if job_id != self.job_id {
            return Err(ClientError::NotFound(format!("job {}", job_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl JobsApi for InMemoryJobsApi {
    async fn submit(&self, job: &Job) -> Result<PutJobResponse> {
        let mut inner = self.lock();
        if let Some((status, message)) = &inner.submit_error {
            return Err(ClientError::api_error(*status, message.clone()));
        }

        inner.submitted.push(job.clone());

        Ok(PutJobResponse {
            job_id: self.job_id.clone(),
            evaluation_id: format!("e-{}", inner.submitted.len()),
            warnings: Vec::new(),
        })
    }

    async fn get_job(&self, job_id: &str, _include_executions: bool) -> Result<GetJobResponse> {
        self.check_id(job_id)?;

        let mut inner = self.lock();
        inner.get_job_calls += 1;

        let mut job = inner
            .submitted
            .last()
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("job {}", job_id)))?;

        let state = if inner.states.len() > 1 {
            inner.states.pop_front()
        } else {
            inner.states.front().cloned()
        };

        job.id = Some(self.job_id.clone());
        job.state = Some(state.unwrap_or(JobState {
            state_type: JobStateType::Pending,
            message: String::new(),
        }));

        Ok(GetJobResponse {
            job,
            executions: None,
        })
    }

    async fn list_results(&self, job_id: &str) -> Result<ListJobResultsResponse> {
        self.check_id(job_id)?;

        let mut inner = self.lock();
        inner.list_results_calls += 1;

        if let Some((status, message)) = &inner.results_error {
            return Err(ClientError::api_error(*status, message.clone()));
        }

        Ok(ListJobResultsResponse {
            items: inner.results.clone(),
            next_token: String::new(),
        })
    }
}
