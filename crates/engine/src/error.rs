use std::path::PathBuf;

use thiserror::Error;
use wfinterop_api::ApiError;
use wfinterop_config::ConfigError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("queue '{queue_id}' does not allow execution service '{wes_id}' (allowed: {allowed})")]
    WesNotAllowed { queue_id: String, wes_id: String, allowed: String },

    #[error("queue '{queue_id}' has no execution service; pass one explicitly or set wes_default")]
    NoWesSelected { queue_id: String },

    #[error("descriptor for '{workflow_id}' version '{version_id}' has no url")]
    MissingWorkflowUrl { workflow_id: String, version_id: String },

    #[error("execution service '{wes_id}' does not support workflow type '{workflow_type}'")]
    UnsupportedWorkflowType { wes_id: String, workflow_type: String },

    #[error("failed to read parameters from {}: {source}", .path.display())]
    ParamsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid parameters in {}: {message}", .path.display())]
    ParamsParse { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
