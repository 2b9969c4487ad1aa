//! Execution domain types
//!
//! An execution is one attempt at running a job on a compute node. Executions
//! are only returned when the job is queried with `include=executions`.

use serde::{Deserialize, Serialize};

/// Execution record attached to a job snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Execution {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NodeID", default)]
    pub node_id: String,
    #[serde(default)]
    pub compute_state: ExecutionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_output: Option<RunOutput>,
}

impl Execution {
    /// Message reported by the compute node, if non-empty
    pub fn message(&self) -> Option<&str> {
        Some(self.compute_state.message.as_str()).filter(|m| !m.is_empty())
    }
}

/// Compute-side execution state
///
/// The tag is kept as a string: the client only displays it and never branches
/// on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecutionState {
    #[serde(default)]
    pub state_type: String,
    #[serde(default)]
    pub message: String,
}

/// Output captured from the task process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutput {
    #[serde(rename = "stdout", alias = "Stdout", default)]
    pub stdout: String,
    #[serde(rename = "stderr", alias = "Stderr", default)]
    pub stderr: String,
    #[serde(rename = "exitCode", alias = "ExitCode", default)]
    pub exit_code: i32,
    #[serde(rename = "runnerError", alias = "ErrorMsg", default)]
    pub error_msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_parses_run_output() {
        let json = r#"{
            "ID": "e-1",
            "NodeID": "n-1",
            "ComputeState": {"StateType": "Failed", "Message": "exit status 1"},
            "RunOutput": {"stdout": "", "stderr": "cat: no such file", "exitCode": 1}
        }"#;

        let execution: Execution = serde_json::from_str(json).unwrap();
        assert_eq!(execution.node_id, "n-1");
        assert_eq!(execution.message(), Some("exit status 1"));
        let output = execution.run_output.unwrap();
        assert_eq!(output.exit_code, 1);
        assert_eq!(output.stderr, "cat: no such file");
    }

    #[test]
    fn test_execution_tolerates_missing_state() {
        let execution: Execution = serde_json::from_str(r#"{"ID": "e-2"}"#).unwrap();
        assert_eq!(execution.message(), None);
        assert!(execution.run_output.is_none());
    }
}
