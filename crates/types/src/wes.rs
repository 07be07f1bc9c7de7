//! GA4GH Workflow Execution Service (v1) payloads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowTypeVersion {
    pub workflow_type_version: Vec<String>,
}

/// Response of `GET /service-info`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub workflow_type_versions: IndexMap<String, WorkflowTypeVersion>,
    pub supported_wes_versions: Vec<String>,
    pub supported_filesystem_protocols: Vec<String>,
    pub workflow_engine_versions: IndexMap<String, String>,
    pub default_workflow_engine_parameters: Vec<Value>,
    pub system_state_counts: IndexMap<String, i64>,
    pub auth_instructions_url: Option<String>,
    pub contact_info_url: Option<String>,
    pub tags: IndexMap<String, String>,
}

/// Lifecycle state of a workflow run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    #[default]
    Unknown,
    Queued,
    Initializing,
    Running,
    Paused,
    Complete,
    ExecutorError,
    SystemError,
    Canceled,
    Canceling,
}

impl State {
    /// Whether the run can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::ExecutorError | Self::SystemError | Self::Canceled)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunId {
    pub run_id: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatus {
    pub run_id: String,
    pub state: State,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunListResponse {
    pub runs: Vec<RunStatus>,
    pub next_page_token: Option<String>,
}

/// Parameters of a run submission (`POST /runs`).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunRequest {
    pub workflow_params: Value,
    pub workflow_type: String,
    pub workflow_type_version: String,
    pub tags: IndexMap<String, String>,
    pub workflow_engine_parameters: IndexMap<String, String>,
    pub workflow_url: String,
}

/// Log of a single command (the workflow itself or one of its tasks).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub name: Option<String>,
    pub cmd: Vec<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
}

/// Response of `GET /runs/{run_id}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunLog {
    pub run_id: String,
    pub request: Option<RunRequest>,
    pub state: State,
    pub run_log: Option<Log>,
    pub task_logs: Vec<Log>,
    pub outputs: Value,
}
