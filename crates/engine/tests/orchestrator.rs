use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use wfinterop_api::{ApiError, Trs, TrsApi, Wes, WesApi};
use wfinterop_config::ConfigStore;
use wfinterop_engine::{Orchestrator, OrchestratorError, ServiceConnector};
use wfinterop_types::{
    FileWrapper, Metadata, QueueEntry, RunId, RunListResponse, RunLog, RunRequest, RunStatus, ServiceEntry, ServiceInfo, State, Tool,
    ToolFile, ToolVersion, WorkflowTypeVersion,
};

const DESCRIPTOR_URL: &str = "https://raw.example.org/md5sum/main/md5sum.cwl";

struct FakeTrs {
    descriptor_url: Option<String>,
    descriptor_calls: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl TrsApi for FakeTrs {
    async fn metadata_get(&self) -> Result<Metadata, ApiError> {
        Ok(Metadata::default())
    }

    async fn tools_id_get(&self, _id: &str) -> Result<Tool, ApiError> {
        Ok(Tool::default())
    }

    async fn tools_id_versions_get(&self, _id: &str) -> Result<Vec<ToolVersion>, ApiError> {
        Ok(Vec::new())
    }

    async fn descriptor_get(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<FileWrapper, ApiError> {
        self.descriptor_calls
            .lock()
            .unwrap()
            .push(format!("{id} {version_id} {descriptor_type}"));
        Ok(FileWrapper {
            url: self.descriptor_url.clone(),
            ..Default::default()
        })
    }

    async fn descriptor_relative_path_get(&self, _: &str, _: &str, _: &str, _: &str) -> Result<FileWrapper, ApiError> {
        Ok(FileWrapper::default())
    }

    async fn tests_get(&self, _: &str, _: &str, _: &str) -> Result<Vec<FileWrapper>, ApiError> {
        Ok(Vec::new())
    }

    async fn files_get(&self, _: &str, _: &str, _: &str) -> Result<Vec<ToolFile>, ApiError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct FakeWes {
    submitted: Mutex<Vec<RunRequest>>,
    canceled: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl WesApi for FakeWes {
    async fn service_info(&self) -> Result<ServiceInfo, ApiError> {
        let mut info = ServiceInfo::default();
        info.workflow_type_versions.insert(
            "CWL".into(),
            WorkflowTypeVersion {
                workflow_type_version: vec!["v1.0".into(), "v1.2".into()],
            },
        );
        Ok(info)
    }

    async fn list_runs(&self, page_size: Option<u32>, page_token: Option<&str>) -> Result<RunListResponse, ApiError> {
        let start: usize = page_token.map_or(0, |token| token.parse().unwrap());
        let total = self.submitted.lock().unwrap().len();
        let end = page_size.map_or(total, |size| (start + size as usize).min(total));
        Ok(RunListResponse {
            runs: (start..end)
                .map(|index| RunStatus {
                    run_id: format!("run-{}", index + 1),
                    state: State::Complete,
                })
                .collect(),
            next_page_token: (end < total).then(|| end.to_string()),
        })
    }

    async fn run_workflow(&self, request: &RunRequest) -> Result<RunId, ApiError> {
        if request.workflow_params.get("fail").is_some() {
            return Err(ApiError::Status {
                method: "POST".into(),
                url: "http://wes/runs".into(),
                status: 400,
                message: "bad params".into(),
            });
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(request.clone());
        Ok(RunId {
            run_id: format!("run-{}", submitted.len()),
        })
    }

    async fn get_run_log(&self, run_id: &str) -> Result<RunLog, ApiError> {
        Ok(RunLog {
            run_id: run_id.into(),
            ..Default::default()
        })
    }

    async fn get_run_status(&self, run_id: &str) -> Result<RunStatus, ApiError> {
        Ok(RunStatus {
            run_id: run_id.into(),
            state: State::Queued,
        })
    }

    async fn cancel_run(&self, run_id: &str) -> Result<RunId, ApiError> {
        self.canceled.lock().unwrap().push(run_id.to_string());
        Ok(RunId { run_id: run_id.into() })
    }
}

struct FakeConnector {
    trs: Arc<FakeTrs>,
    wes: Arc<FakeWes>,
    wes_ids: Mutex<Vec<String>>,
}

impl FakeConnector {
    fn new(descriptor_url: Option<&str>) -> Self {
        Self {
            trs: Arc::new(FakeTrs {
                descriptor_url: descriptor_url.map(str::to_string),
                descriptor_calls: Mutex::new(Vec::new()),
            }),
            wes: Arc::new(FakeWes::default()),
            wes_ids: Mutex::new(Vec::new()),
        }
    }
}

impl ServiceConnector for FakeConnector {
    fn trs(&self, _trs_id: &str, _entry: &ServiceEntry) -> Result<Trs, ApiError> {
        Ok(Trs::new(self.trs.clone()))
    }

    fn wes(&self, wes_id: &str, _entry: &ServiceEntry) -> Result<Wes, ApiError> {
        self.wes_ids.lock().unwrap().push(wes_id.to_string());
        Ok(Wes::new(self.wes.clone()))
    }
}

fn store(dir: &tempfile::TempDir) -> ConfigStore {
    let store = ConfigStore::new(dir.path().join("config.yaml"));
    store
        .add_queue(
            QueueEntry::new("github.com/ga4gh/md5sum", "main", "CWL")
                .with_wes_default("local")
                .with_wes_opts(["local", "remote"]),
        )
        .unwrap();
    store
        .add_tool_registry("dockstore", ServiceEntry::new("dockstore.org", "https"))
        .unwrap();
    store
        .add_workflow_service("local", ServiceEntry::new("localhost:8080", "http"))
        .unwrap();
    store
        .add_workflow_service("remote", ServiceEntry::new("wes.example.org", "https"))
        .unwrap();
    store
}

const QUEUE_ID: &str = "github.com/ga4gh/md5sum__main";

#[tokio::test]
async fn run_single_submits_descriptor_url_to_default_wes() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL)));
    let orchestrator = Orchestrator::new(store(&dir), connector.clone());

    let submission = orchestrator
        .run_single(QUEUE_ID, None, json!({"input_file": "md5sum.input"}))
        .await
        .unwrap();

    assert_eq!(submission.queue_id, QUEUE_ID);
    assert_eq!(submission.wes_id, "local");
    assert_eq!(submission.run_id, "run-1");
    assert_eq!(submission.workflow_url, DESCRIPTOR_URL);

    assert_eq!(
        connector.trs.descriptor_calls.lock().unwrap().as_slice(),
        &["%23workflow%2Fgithub.com%2Fga4gh%2Fmd5sum main CWL".to_string()]
    );
    let submitted = connector.wes.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].workflow_type, "CWL");
    assert_eq!(submitted[0].workflow_type_version, "v1.0");
    assert_eq!(submitted[0].workflow_params["input_file"], "md5sum.input");
}

#[tokio::test]
async fn run_single_uses_explicit_wes() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL)));
    let orchestrator = Orchestrator::new(store(&dir), connector.clone());

    let submission = orchestrator.run_single(QUEUE_ID, Some("remote"), json!({})).await.unwrap();
    assert_eq!(submission.wes_id, "remote");
    assert_eq!(connector.wes_ids.lock().unwrap().as_slice(), &["remote".to_string()]);
}

#[tokio::test]
async fn run_single_rejects_wes_outside_wes_opts() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL)));
    let orchestrator = Orchestrator::new(store(&dir), connector.clone());

    let err = orchestrator.run_single(QUEUE_ID, Some("elsewhere"), json!({})).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::WesNotAllowed { ref wes_id, .. } if wes_id == "elsewhere"));
    assert!(connector.wes.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn run_single_requires_descriptor_url() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(store(&dir), Arc::new(FakeConnector::new(None)));

    let err = orchestrator.run_single(QUEUE_ID, None, json!({})).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::MissingWorkflowUrl { .. }));
}

#[tokio::test]
async fn run_single_reports_unknown_queue() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(store(&dir), Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL))));

    let err = orchestrator.run_single("nope__main", None, json!({})).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Config(_)));
}

#[tokio::test]
async fn run_multi_continues_past_failed_job() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL)));
    let orchestrator = Orchestrator::new(store(&dir), connector.clone());

    let jobs: Vec<(String, Value)> = vec![
        ("a.json".into(), json!({"sample": "a"})),
        ("b.json".into(), json!({"fail": true})),
        ("c.json".into(), json!({"sample": "c"})),
    ];
    let outcomes = orchestrator.run_multi(QUEUE_ID, None, jobs).await.unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(!outcomes[1].is_success());
    assert!(outcomes[1].error.as_deref().unwrap().contains("bad params"));
    assert_eq!(outcomes[2].submission.as_ref().unwrap().run_id, "run-2");
    assert_eq!(connector.wes.submitted.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn run_status_queries_named_service() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL)));
    let orchestrator = Orchestrator::new(store(&dir), connector.clone());

    let status = orchestrator.run_status("remote", "run-9").await.unwrap();
    assert_eq!(status.run_id, "run-9");
    assert_eq!(status.state, State::Queued);
    assert!(orchestrator.run_status("missing", "run-9").await.is_err());
}

#[tokio::test]
async fn run_log_and_cancel_reach_named_service() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL)));
    let orchestrator = Orchestrator::new(store(&dir), connector.clone());

    let log = orchestrator.run_log("local", "run-3").await.unwrap();
    assert_eq!(log.run_id, "run-3");

    let canceled = orchestrator.cancel_run("remote", "run-3").await.unwrap();
    assert_eq!(canceled.run_id, "run-3");
    assert_eq!(connector.wes.canceled.lock().unwrap().as_slice(), &["run-3".to_string()]);
    assert_eq!(connector.wes_ids.lock().unwrap().as_slice(), &["local".to_string(), "remote".to_string()]);

    let err = orchestrator.cancel_run("missing", "run-3").await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Config(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn list_runs_pages_through_submitted_runs() {
    let dir = tempfile::tempdir().unwrap();
    let connector = Arc::new(FakeConnector::new(Some(DESCRIPTOR_URL)));
    let orchestrator = Orchestrator::new(store(&dir), connector.clone());
    let jobs = (0..3).map(|index| (format!("job{index}"), json!({"n": index}))).collect();
    orchestrator.run_multi(QUEUE_ID, None, jobs).await.unwrap();

    let first = orchestrator.list_runs("local", Some(2), None).await.unwrap();
    assert_eq!(first.runs.iter().map(|run| run.run_id.as_str()).collect::<Vec<_>>(), vec!["run-1", "run-2"]);
    assert!(first.runs.iter().all(|run| run.state.is_terminal()));
    let token = first.next_page_token.expect("more runs");

    let rest = orchestrator.list_runs("local", Some(2), Some(&token)).await.unwrap();
    assert_eq!(rest.runs.len(), 1);
    assert_eq!(rest.next_page_token, None);
}
