//! Lifecycle poller
//!
//! Queries a submitted job at a fixed interval until it reaches a terminal
//! state or the workflow deadline elapses.

use skiff_client::JobsApi;
use skiff_core::domain::job::JobStateType;
use skiff_core::dto::job::GetJobResponse;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, WorkflowError};

/// Client-side view of a job's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Submitted, no status observed yet
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl LifecycleState {
    /// Applies an observed service state
    ///
    /// Terminal states absorb every further observation. Service states the
    /// client does not act on (pending, queued, unknown tags) leave the state
    /// unchanged.
    pub fn advance(self, observed: JobStateType) -> Self {
        if self.is_terminal() {
            return self;
        }

        match observed {
            JobStateType::Running => LifecycleState::Running,
            JobStateType::Completed => LifecycleState::Completed,
            JobStateType::Failed => LifecycleState::Failed,
            JobStateType::Stopped => LifecycleState::Stopped,
            JobStateType::Undefined
            | JobStateType::Pending
            | JobStateType::Queued
            | JobStateType::Unknown => self,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.terminal().is_some()
    }

    /// The terminal form of this state, if it is one
    pub fn terminal(self) -> Option<TerminalState> {
        match self {
            LifecycleState::Completed => Some(TerminalState::Completed),
            LifecycleState::Failed => Some(TerminalState::Failed),
            LifecycleState::Stopped => Some(TerminalState::Stopped),
            LifecycleState::Pending | LifecycleState::Running => None,
        }
    }
}

/// States that end polling
///
/// Running out of time is not among them: the deadline surfaces as
/// [`WorkflowError::TimedOut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Completed,
    Failed,
    Stopped,
}

/// Terminal state together with the snapshot that revealed it
#[derive(Debug, Clone)]
pub struct TerminalStatus {
    pub state: TerminalState,
    pub snapshot: GetJobResponse,
}

impl TerminalStatus {
    /// Best available explanation for the terminal state
    ///
    /// Falls back to the first execution message when the job state itself
    /// carries none.
    pub fn message(&self) -> Option<String> {
        self.snapshot
            .job
            .state_message()
            .or_else(|| self.snapshot.executions().iter().find_map(|e| e.message()))
            .map(str::to_string)
    }
}

/// Polls one job until it is terminal
pub struct LifecyclePoller<'a> {
    api: &'a dyn JobsApi,
    poll_interval: Duration,
    query_retries: u32,
    deadline: Instant,
}

impl<'a> LifecyclePoller<'a> {
    /// Creates a poller bounded by `deadline`
    pub fn new(api: &'a dyn JobsApi, config: &Config, deadline: Instant) -> Self {
        Self {
            api,
            poll_interval: config.poll_interval,
            query_retries: config.query_retries,
            deadline,
        }
    }

    /// Polls until the job is Completed, Failed or Stopped
    ///
    /// # Errors
    /// * [`WorkflowError::TimedOut`] if the deadline elapses first
    /// * [`WorkflowError::Query`] if a status query fails (after the configured
    ///   retries for transient failures)
    pub async fn wait_for_terminal(&self, job_id: &str) -> Result<TerminalStatus> {
        let mut state = LifecycleState::Pending;
        let mut failures = 0u32;

        loop {
            info!("Checking job status...");

            let snapshot = match self.query(job_id).await? {
                Ok(snapshot) => {
                    failures = 0;
                    snapshot
                }
                Err(e) if e.is_transient() && failures < self.query_retries => {
                    failures += 1;
                    warn!(
                        "Status query for job {} failed (attempt {}/{}): {}",
                        job_id, failures, self.query_retries, e
                    );
                    self.sleep().await?;
                    continue;
                }
                Err(e) => return Err(WorkflowError::Query(e)),
            };

            let observed = snapshot.job.state_type();
            let next = state.advance(observed);
            if next != state {
                debug!("Job {} moved {:?} -> {:?}", job_id, state, next);
                state = next;
            }

            if let Some(state) = state.terminal() {
                return Ok(TerminalStatus { state, snapshot });
            }

            match observed {
                JobStateType::Running => info!("Job is running"),
                other => info!("Job is {}", other),
            }

            if let Ok(json) = serde_json::to_string_pretty(&snapshot.job) {
                debug!("{}", json);
            }

            self.sleep().await?;
        }
    }

    /// Issues one status query, bounded by the deadline
    async fn query(&self, job_id: &str) -> Result<skiff_client::Result<GetJobResponse>> {
        time::timeout_at(self.deadline, self.api.get_job(job_id, true))
            .await
            .map_err(|_| WorkflowError::TimedOut)
    }

    /// Waits one poll interval, failing if the deadline comes first
    async fn sleep(&self) -> Result<()> {
        time::timeout_at(self.deadline, time::sleep(self.poll_interval))
            .await
            .map_err(|_| WorkflowError::TimedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_client::InMemoryJobsApi;
    use skiff_core::domain::job::{JOB_TYPE_BATCH, Job};
    use std::collections::HashMap;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.poll_interval = Duration::from_millis(5);
        config
    }

    async fn submitted(api: &InMemoryJobsApi) {
        let job = Job {
            id: None,
            name: "test".to_string(),
            namespace: "default".to_string(),
            job_type: JOB_TYPE_BATCH.to_string(),
            count: 1,
            priority: 0,
            meta: HashMap::new(),
            labels: HashMap::new(),
            tasks: vec![],
            state: None,
            version: 0,
            revision: 0,
            create_time: 0,
            modify_time: 0,
        };
        api.submit(&job).await.unwrap();
    }

    #[test]
    fn test_advance_terminal_transitions() {
        let pending = LifecycleState::Pending;
        assert_eq!(pending.advance(JobStateType::Running), LifecycleState::Running);
        assert_eq!(pending.advance(JobStateType::Completed), LifecycleState::Completed);
        assert_eq!(pending.advance(JobStateType::Failed), LifecycleState::Failed);
        assert_eq!(pending.advance(JobStateType::Stopped), LifecycleState::Stopped);
    }

    #[test]
    fn test_advance_ignores_non_actionable_states() {
        assert_eq!(
            LifecycleState::Pending.advance(JobStateType::Queued),
            LifecycleState::Pending
        );
        assert_eq!(
            LifecycleState::Running.advance(JobStateType::Unknown),
            LifecycleState::Running
        );
        assert_eq!(
            LifecycleState::Running.advance(JobStateType::Pending),
            LifecycleState::Running
        );
    }

    #[test]
    fn test_terminal_mapping() {
        assert_eq!(LifecycleState::Pending.terminal(), None);
        assert_eq!(LifecycleState::Running.terminal(), None);
        assert_eq!(
            LifecycleState::Completed.terminal(),
            Some(TerminalState::Completed)
        );
        assert_eq!(LifecycleState::Failed.terminal(), Some(TerminalState::Failed));
        assert_eq!(LifecycleState::Stopped.terminal(), Some(TerminalState::Stopped));
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        for terminal in [
            LifecycleState::Completed,
            LifecycleState::Failed,
            LifecycleState::Stopped,
        ] {
            assert!(terminal.is_terminal());
            assert_eq!(terminal.advance(JobStateType::Running), terminal);
            assert_eq!(terminal.advance(JobStateType::Completed), terminal);
        }
    }

    #[tokio::test]
    async fn test_stops_polling_after_completed() {
        let api = InMemoryJobsApi::new("job-1").with_states([
            JobStateType::Pending,
            JobStateType::Running,
            JobStateType::Completed,
            JobStateType::Running,
            JobStateType::Failed,
        ]);
        submitted(&api).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        let poller = LifecyclePoller::new(&api, &test_config(), deadline);
        let status = poller.wait_for_terminal("job-1").await.unwrap();

        assert_eq!(status.state, TerminalState::Completed);
        assert_eq!(api.get_job_calls(), 3);
    }

    #[tokio::test]
    async fn test_unknown_states_keep_polling() {
        let api = InMemoryJobsApi::new("job-1").with_states([
            JobStateType::Unknown,
            JobStateType::Queued,
            JobStateType::Unknown,
            JobStateType::Stopped,
        ]);
        submitted(&api).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        let poller = LifecyclePoller::new(&api, &test_config(), deadline);
        let status = poller.wait_for_terminal("job-1").await.unwrap();

        assert_eq!(status.state, TerminalState::Stopped);
        assert_eq!(api.get_job_calls(), 4);
    }

    #[tokio::test]
    async fn test_failed_carries_message() {
        let api = InMemoryJobsApi::new("job-1")
            .with_state_messages([(JobStateType::Failed, "engine error".to_string())]);
        submitted(&api).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        let poller = LifecyclePoller::new(&api, &test_config(), deadline);
        let status = poller.wait_for_terminal("job-1").await.unwrap();

        assert_eq!(status.state, TerminalState::Failed);
        assert_eq!(status.message().as_deref(), Some("engine error"));
        assert_eq!(api.get_job_calls(), 1);
    }

    #[tokio::test]
    async fn test_times_out_when_never_terminal() {
        let api = InMemoryJobsApi::new("job-1").with_states([JobStateType::Running]);
        submitted(&api).await;

        let deadline = Instant::now() + Duration::from_millis(50);
        let poller = LifecyclePoller::new(&api, &test_config(), deadline);
        let err = poller.wait_for_terminal("job-1").await.unwrap_err();

        assert!(err.is_timeout());
        assert!(api.get_job_calls() >= 1);
    }

    #[tokio::test]
    async fn test_query_error_is_fatal_without_retries() {
        let api = InMemoryJobsApi::new("job-1");
        submitted(&api).await;

        let deadline = Instant::now() + Duration::from_secs(5);
        let poller = LifecyclePoller::new(&api, &test_config(), deadline);
        let err = poller.wait_for_terminal("unknown-job").await.unwrap_err();

        assert!(matches!(err, WorkflowError::Query(_)));
    }
}
