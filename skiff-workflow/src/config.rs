//! Workflow configuration
//!
//! Defines all configurable parameters of the job workflow: orchestrator
//! connection, poll cadence, the overall deadline and local directories.

use std::path::PathBuf;
use std::time::Duration;

/// Default orchestrator endpoint
pub const DEFAULT_ORCHESTRATOR_URL: &str = "http://localhost:1234";

/// Workflow configuration
///
/// Passed explicitly to every component; nothing reads process-wide state
/// after construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Orchestrator base URL (e.g., "http://localhost:1234")
    pub orchestrator_url: String,

    /// Upper bound for a single API request
    pub request_timeout: Duration,

    /// Delay between two status queries
    pub poll_interval: Duration,

    /// Wall-clock budget for the whole workflow, measured from its start
    pub deadline: Duration,

    /// Consecutive transient status-query failures tolerated before aborting
    pub query_retries: u32,

    /// Local directory mounted into the task as its input
    pub inputs_dir: PathBuf,

    /// Local directory receiving downloaded archives and extracted results
    pub outputs_dir: PathBuf,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(orchestrator_url: String) -> Self {
        Self {
            orchestrator_url,
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            deadline: Duration::from_secs(300), // 5 minutes
            query_retries: 0,
            inputs_dir: PathBuf::from("inputs"),
            outputs_dir: PathBuf::from("outputs"),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Every variable is optional; unset or unparsable values keep the default.
    /// - SKIFF_ORCHESTRATOR_URL (default: http://localhost:1234)
    /// - SKIFF_REQUEST_TIMEOUT_SECS (default: 30)
    /// - SKIFF_POLL_INTERVAL_MS (default: 1000)
    /// - SKIFF_DEADLINE_SECS (default: 300)
    /// - SKIFF_QUERY_RETRIES (default: 0)
    /// - SKIFF_INPUTS_DIR (default: inputs)
    /// - SKIFF_OUTPUTS_DIR (default: outputs)
    pub fn from_env() -> Self {
        let orchestrator_url = std::env::var("SKIFF_ORCHESTRATOR_URL")
            .unwrap_or_else(|_| DEFAULT_ORCHESTRATOR_URL.to_string());

        let mut config = Self::new(orchestrator_url);

        if let Some(secs) = env_parse::<u64>("SKIFF_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(ms) = env_parse::<u64>("SKIFF_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(secs) = env_parse::<u64>("SKIFF_DEADLINE_SECS") {
            config.deadline = Duration::from_secs(secs);
        }

        if let Some(retries) = env_parse::<u32>("SKIFF_QUERY_RETRIES") {
            config.query_retries = retries;
        }

        if let Ok(dir) = std::env::var("SKIFF_INPUTS_DIR") {
            config.inputs_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("SKIFF_OUTPUTS_DIR") {
            config.outputs_dir = PathBuf::from(dir);
        }

        config
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.orchestrator_url.is_empty() {
            anyhow::bail!("orchestrator_url cannot be empty");
        }

        if !self.orchestrator_url.starts_with("http://")
            && !self.orchestrator_url.starts_with("https://")
        {
            anyhow::bail!("orchestrator_url must start with http:// or https://");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.deadline.is_zero() {
            anyhow::bail!("deadline must be greater than 0");
        }

        if self.outputs_dir.as_os_str().is_empty() {
            anyhow::bail!("outputs_dir cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_ORCHESTRATOR_URL.to_string())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}
