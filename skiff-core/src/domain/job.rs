//! Job domain types
//!
//! These mirror the orchestration service's job model. Field names follow the
//! service's JSON schema (PascalCase), so the same structures are used both for
//! submission and for the snapshots returned by status queries.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Job type for run-to-completion workloads
pub const JOB_TYPE_BATCH: &str = "batch";

/// Batch job description
///
/// Built once by the client and immutable after submission. Service-assigned
/// fields (`id`, `state`, timestamps) are only populated on snapshots returned
/// by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Job {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub namespace: String,
    #[serde(rename = "Type")]
    pub job_type: String,
    pub count: u32,
    pub priority: i32,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub meta: HashMap<String, String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub version: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub revision: u64,
    /// Creation time in nanoseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub create_time: i64,
    /// Last modification time in nanoseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub modify_time: i64,
}

impl Job {
    /// Current state tag, `Undefined` when the snapshot carries no state
    pub fn state_type(&self) -> JobStateType {
        self.state
            .as_ref()
            .map(|s| s.state_type)
            .unwrap_or(JobStateType::Undefined)
    }

    /// Human-readable message attached to the current state, if non-empty
    pub fn state_message(&self) -> Option<&str> {
        self.state
            .as_ref()
            .map(|s| s.message.as_str())
            .filter(|m| !m.is_empty())
    }

    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        nanos_to_datetime(self.create_time)
    }

    pub fn modified_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        nanos_to_datetime(self.modify_time)
    }
}

/// One execution unit within a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    pub name: String,
    pub engine: SpecConfig,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub input_sources: Vec<InputSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<SpecConfig>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_default")]
    pub result_paths: Vec<ResultPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesConfig>,
}

/// Typed, parameterised plug-in configuration
///
/// Used for engines (`docker`), input sources (`localDirectory`), publishers
/// (`local`) and result items (`urlDownload`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecConfig {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "crate::serde_util::null_as_default",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub params: HashMap<String, JsonValue>,
}

impl SpecConfig {
    /// Create a config of the given type with no parameters
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: HashMap::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Get a parameter as a string slice
    ///
    /// Returns `None` when the parameter is missing or not a JSON string.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(JsonValue::as_str)
    }
}

/// Data mounted into a task before it runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputSource {
    pub source: SpecConfig,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    pub target: String,
}

/// In-container path whose contents are published after the task finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultPath {
    pub name: String,
    pub path: String,
}

/// Resource limits, expressed as quantity strings ("0.5", "100m", ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcesConfig {
    #[serde(rename = "CPU", default, skip_serializing_if = "String::is_empty")]
    pub cpu: String,
    #[serde(rename = "Memory", default, skip_serializing_if = "String::is_empty")]
    pub memory: String,
    #[serde(rename = "Disk", default, skip_serializing_if = "String::is_empty")]
    pub disk: String,
    #[serde(rename = "GPU", default, skip_serializing_if = "String::is_empty")]
    pub gpu: String,
}

/// Job state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobState {
    pub state_type: JobStateType,
    #[serde(default)]
    pub message: String,
}

/// Job state tag as reported by the orchestrator
///
/// Tags this client does not know deserialize to `Unknown` and are treated as
/// non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStateType {
    Undefined,
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    Stopped,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for JobStateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

fn nanos_to_datetime(nanos: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    (nanos > 0).then(|| chrono::DateTime::<chrono::Utc>::from_timestamp_nanos(nanos))
}
