//! Error types for the job workflow

use skiff_client::ClientError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors raised while driving a job through its lifecycle
///
/// Job-reported failures are not errors: a job that ends `Failed` or `Stopped`
/// is a normal [`crate::WorkflowOutcome`].
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The local environment cannot support the workflow (e.g. no working directory)
    #[error("Local environment error: {context}: {source}")]
    LocalEnvironment {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The orchestrator rejected the job
    #[error("Failed to submit job: {0}")]
    Submission(#[source] ClientError),

    /// A status query failed
    #[error("Failed to get job status: {0}")]
    Query(#[source] ClientError),

    /// The workflow deadline elapsed before the job reached a terminal state
    #[error("Workflow deadline exceeded")]
    TimedOut,

    /// Listing the results of a completed job failed
    #[error("Failed to list job results: {0}")]
    Results(#[source] ClientError),

    /// The result set does not have the expected shape
    #[error("Malformed result set: {0}")]
    MalformedResult(String),

    /// The archive server answered with a non-success status
    #[error("Download of {url} failed with status {status}")]
    Download { url: String, status: u16 },

    /// The archive download broke off
    #[error("Download of {url} failed: {source}")]
    DownloadTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The archive could not be decoded
    #[error("Corrupt archive {path:?}: {reason}")]
    ArchiveCorrupt { path: PathBuf, reason: String },

    /// An archive entry would be written outside the destination
    #[error("Archive entry {entry:?} escapes the destination directory")]
    UnsafeEntry { entry: PathBuf },

    /// A local file operation failed
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WorkflowError {
    /// Build an `Io` error for `path`, for use with `map_err`
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    /// Whether the failure is the workflow deadline rather than a fault
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}
