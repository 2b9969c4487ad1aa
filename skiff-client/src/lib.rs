//! Skiff HTTP Client
//!
//! A small, type-safe client for the jobs API of a batch orchestration service.
//!
//! The [`JobsApi`] trait captures the three operations the job workflow needs:
//! submit, get (with executions) and list results. [`OrchestratorClient`]
//! implements it over HTTP, [`InMemoryJobsApi`] implements it in memory for tests.
//!
//! # Example
//!
//! ```no_run
//! use skiff_client::{JobsApi, OrchestratorClient};
//! # use skiff_core::domain::job::Job;
//!
//! # async fn example(job: Job) -> anyhow::Result<()> {
//! let client = OrchestratorClient::new("http://localhost:1234");
//!
//! let receipt = client.submit(&job).await?;
//! let snapshot = client.get_job(&receipt.job_id, true).await?;
//!
//! println!("Job {} is {}", receipt.job_id, snapshot.job.state_type());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
mod jobs;
pub mod memory;

// Re-export commonly used types
pub use api::JobsApi;
pub use error::{ClientError, Result};
pub use memory::InMemoryJobsApi;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the orchestrator jobs API
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// Base URL of the orchestrator (e.g., "http://localhost:1234")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl OrchestratorClient {
    /// Create a new orchestrator client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the orchestrator API (e.g., "http://localhost:1234")
    ///
    /// # Example
    /// ```
    /// use skiff_client::OrchestratorClient;
    ///
    /// let client = OrchestratorClient::new("http://localhost:1234");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new orchestrator client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use skiff_client::OrchestratorClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = OrchestratorClient::with_client("http://localhost:1234", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Create a client whose every request is bounded by `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Get the base URL of the orchestrator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
