//! Queue-driven run submission.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use wfinterop_api::Wes;
use wfinterop_config::ConfigStore;
use wfinterop_types::{QueueEntry, RunId, RunListResponse, RunLog, RunRequest, RunStatus};

use crate::{OrchestratorError, ServiceConnector};

/// A run accepted by an execution service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSubmission {
    pub queue_id: String,
    pub wes_id: String,
    pub run_id: String,
    pub workflow_url: String,
    pub submitted_at: DateTime<Utc>,
}

/// Result of one job in a batch. Exactly one of `submission` and `error`
/// is set.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<RunSubmission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.submission.is_some()
    }
}

/// Everything resolved from a queue before parameters are attached.
struct PreparedQueue {
    queue_id: String,
    wes_id: String,
    wes: Wes,
    template: RunRequest,
}

impl PreparedQueue {
    async fn submit(&self, params: Value) -> Result<RunSubmission, OrchestratorError> {
        let request = RunRequest {
            workflow_params: params,
            ..self.template.clone()
        };
        let run = self.wes.run_workflow(&request).await?;
        Ok(RunSubmission {
            queue_id: self.queue_id.clone(),
            wes_id: self.wes_id.clone(),
            run_id: run.run_id,
            workflow_url: request.workflow_url,
            submitted_at: Utc::now(),
        })
    }
}

/// Submits queued workflows to execution services named in the configuration.
pub struct Orchestrator {
    store: ConfigStore,
    connector: Arc<dyn ServiceConnector>,
}

impl Orchestrator {
    pub fn new(store: ConfigStore, connector: Arc<dyn ServiceConnector>) -> Self {
        Self { store, connector }
    }

    /// Run the queue's workflow once with `params`.
    ///
    /// `wes_id` falls back to the queue's `wes_default`; either way it must be
    /// listed in the queue's `wes_opts`.
    pub async fn run_single(&self, queue_id: &str, wes_id: Option<&str>, params: Value) -> Result<RunSubmission, OrchestratorError> {
        let prepared = self.prepare(queue_id, wes_id).await?;
        prepared.submit(params).await
    }

    /// Run the queue's workflow once per job, in order, against one service.
    ///
    /// Resolving the queue fails the whole batch; a failed submission is
    /// recorded on its outcome and later jobs still run.
    pub async fn run_multi(
        &self,
        queue_id: &str,
        wes_id: Option<&str>,
        jobs: Vec<(String, Value)>,
    ) -> Result<Vec<JobOutcome>, OrchestratorError> {
        let prepared = self.prepare(queue_id, wes_id).await?;
        let mut outcomes = Vec::with_capacity(jobs.len());
        for (label, params) in jobs {
            let outcome = match prepared.submit(params).await {
                Ok(submission) => JobOutcome {
                    label,
                    submission: Some(submission),
                    error: None,
                },
                Err(error) => {
                    warn!(queue_id, job = %label, error = %error, "job submission failed");
                    JobOutcome {
                        label,
                        submission: None,
                        error: Some(error.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }
        let failed = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
        info!(queue_id, wes_id = %prepared.wes_id, total = outcomes.len(), failed, "finished batch");
        Ok(outcomes)
    }

    /// Current state of a run on the service `wes_id`.
    pub async fn run_status(&self, wes_id: &str, run_id: &str) -> Result<RunStatus, OrchestratorError> {
        Ok(self.wes(wes_id)?.get_run_status(run_id).await?)
    }

    /// Full log of a run: request, task logs and outputs.
    pub async fn run_log(&self, wes_id: &str, run_id: &str) -> Result<RunLog, OrchestratorError> {
        Ok(self.wes(wes_id)?.get_run_log(run_id).await?)
    }

    pub async fn cancel_run(&self, wes_id: &str, run_id: &str) -> Result<RunId, OrchestratorError> {
        let canceled = self.wes(wes_id)?.cancel_run(run_id).await?;
        info!(wes_id, run_id = %canceled.run_id, "requested run cancellation");
        Ok(canceled)
    }

    /// One page of the runs known to `wes_id`.
    pub async fn list_runs(
        &self,
        wes_id: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<RunListResponse, OrchestratorError> {
        Ok(self.wes(wes_id)?.list_runs(page_size, page_token).await?)
    }

    fn wes(&self, wes_id: &str) -> Result<Wes, OrchestratorError> {
        let entry = self.store.workflow_service(wes_id)?;
        Ok(self.connector.wes(wes_id, &entry)?)
    }

    async fn prepare(&self, queue_id: &str, wes_id: Option<&str>) -> Result<PreparedQueue, OrchestratorError> {
        let queue = self.store.queue(queue_id)?;
        let wes_id = select_wes(queue_id, &queue, wes_id)?;

        let trs_entry = self.store.tool_registry(queue.trs_id())?;
        let wes_entry = self.store.workflow_service(&wes_id)?;
        let trs = self.connector.trs(queue.trs_id(), &trs_entry)?;
        let wes = self.connector.wes(&wes_id, &wes_entry)?;

        let descriptor = trs
            .get_workflow_descriptor(queue.workflow_id(), queue.version_id(), queue.workflow_type())
            .await?;
        let workflow_url = descriptor
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| OrchestratorError::MissingWorkflowUrl {
                workflow_id: queue.workflow_id().to_string(),
                version_id: queue.version_id().to_string(),
            })?;

        let workflow_type_version = workflow_type_version(&wes, &wes_id, queue.workflow_type()).await?;
        debug!(
            queue_id,
            wes_id = %wes_id,
            workflow_url = %workflow_url,
            workflow_type_version = %workflow_type_version,
            "prepared queue"
        );

        Ok(PreparedQueue {
            queue_id: queue_id.to_string(),
            wes_id,
            wes,
            template: RunRequest {
                workflow_type: queue.workflow_type().to_string(),
                workflow_type_version,
                workflow_url,
                ..Default::default()
            },
        })
    }
}

fn select_wes(queue_id: &str, queue: &QueueEntry, requested: Option<&str>) -> Result<String, OrchestratorError> {
    let wes_id = requested.unwrap_or(queue.wes_default()).trim();
    if wes_id.is_empty() {
        return Err(OrchestratorError::NoWesSelected {
            queue_id: queue_id.to_string(),
        });
    }
    if !queue.allows_wes(wes_id) {
        return Err(OrchestratorError::WesNotAllowed {
            queue_id: queue_id.to_string(),
            wes_id: wes_id.to_string(),
            allowed: queue.wes_opts().collect::<Vec<_>>().join(", "),
        });
    }
    Ok(wes_id.to_string())
}

/// The first version the service lists for `workflow_type` (matched
/// case-insensitively).
async fn workflow_type_version(wes: &Wes, wes_id: &str, workflow_type: &str) -> Result<String, OrchestratorError> {
    let info = wes.get_service_info().await?;
    info.workflow_type_versions
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(workflow_type))
        .and_then(|(_, versions)| versions.workflow_type_version.first().cloned())
        .ok_or_else(|| OrchestratorError::UnsupportedWorkflowType {
            wes_id: wes_id.to_string(),
            workflow_type: workflow_type.to_string(),
        })
}
