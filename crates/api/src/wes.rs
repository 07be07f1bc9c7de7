//! Workflow Execution Service client.

use std::sync::Arc;

use reqwest::Method;
use reqwest::multipart::Form;
use tracing::{debug, info};
use wfinterop_config::ConfigStore;
use wfinterop_types::{RunId, RunListResponse, RunLog, RunRequest, RunStatus, ServiceEntry, ServiceInfo};
use wfinterop_util::http::encode_path_segment;

use crate::{ApiError, ServiceClient};

/// Path under the service host where the WES v1 API is served.
pub const WES_BASE_PATH: &str = "/ga4gh/wes/v1";

/// Raw WES operations.
#[async_trait::async_trait]
pub trait WesApi: Send + Sync {
    async fn service_info(&self) -> Result<ServiceInfo, ApiError>;

    async fn list_runs(&self, page_size: Option<u32>, page_token: Option<&str>) -> Result<RunListResponse, ApiError>;

    async fn run_workflow(&self, request: &RunRequest) -> Result<RunId, ApiError>;

    async fn get_run_log(&self, run_id: &str) -> Result<RunLog, ApiError>;

    async fn get_run_status(&self, run_id: &str) -> Result<RunStatus, ApiError>;

    async fn cancel_run(&self, run_id: &str) -> Result<RunId, ApiError>;
}

/// [`WesApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpWesClient {
    client: ServiceClient,
}

impl HttpWesClient {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn from_entry(entry: &ServiceEntry) -> Result<Self, ApiError> {
        Ok(Self::new(ServiceClient::from_entry(entry, WES_BASE_PATH)?))
    }

    pub fn base_url(&self) -> &str {
        &self.client.base_url
    }
}

/// Encode a run request as the multipart form `POST /runs` expects.
///
/// Structured fields travel as JSON strings; empty tag and engine parameter
/// maps are left out.
fn run_request_form(request: &RunRequest) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text(
            "workflow_params",
            serde_json::to_string(&request.workflow_params).map_err(ApiError::Encode)?,
        )
        .text("workflow_type", request.workflow_type.clone())
        .text("workflow_type_version", request.workflow_type_version.clone())
        .text("workflow_url", request.workflow_url.clone());
    if !request.tags.is_empty() {
        form = form.text("tags", serde_json::to_string(&request.tags).map_err(ApiError::Encode)?);
    }
    if !request.workflow_engine_parameters.is_empty() {
        form = form.text(
            "workflow_engine_parameters",
            serde_json::to_string(&request.workflow_engine_parameters).map_err(ApiError::Encode)?,
        );
    }
    Ok(form)
}

#[async_trait::async_trait]
impl WesApi for HttpWesClient {
    async fn service_info(&self) -> Result<ServiceInfo, ApiError> {
        self.client.get("/service-info").await
    }

    async fn list_runs(&self, page_size: Option<u32>, page_token: Option<&str>) -> Result<RunListResponse, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(page_size) = page_size {
            query.push(("page_size", page_size.to_string()));
        }
        if let Some(page_token) = page_token {
            query.push(("page_token", page_token.to_string()));
        }
        self.client.send(Method::GET, "/runs", |builder| builder.query(&query)).await
    }

    async fn run_workflow(&self, request: &RunRequest) -> Result<RunId, ApiError> {
        let form = run_request_form(request)?;
        self.client.send(Method::POST, "/runs", |builder| builder.multipart(form)).await
    }

    async fn get_run_log(&self, run_id: &str) -> Result<RunLog, ApiError> {
        self.client.get(&format!("/runs/{}", encode_path_segment(run_id))).await
    }

    async fn get_run_status(&self, run_id: &str) -> Result<RunStatus, ApiError> {
        self.client.get(&format!("/runs/{}/status", encode_path_segment(run_id))).await
    }

    async fn cancel_run(&self, run_id: &str) -> Result<RunId, ApiError> {
        let path = format!("/runs/{}/cancel", encode_path_segment(run_id));
        self.client.send(Method::POST, &path, |builder| builder).await
    }
}

/// A workflow execution service, as addressed from the configuration.
#[derive(Clone)]
pub struct Wes {
    api_client: Arc<dyn WesApi>,
}

impl Wes {
    pub fn new(api_client: Arc<dyn WesApi>) -> Self {
        Self { api_client }
    }

    /// Build an HTTP-backed instance from the `workflowservices` entry `wes_id`.
    pub fn from_config(store: &ConfigStore, wes_id: &str) -> Result<Self, ApiError> {
        let entry = store.workflow_service(wes_id)?;
        let client = HttpWesClient::from_entry(&entry)?;
        debug!(wes_id, base_url = client.base_url(), "loaded WES client");
        Ok(Self::new(Arc::new(client)))
    }

    pub async fn get_service_info(&self) -> Result<ServiceInfo, ApiError> {
        self.api_client.service_info().await
    }

    pub async fn list_runs(&self, page_size: Option<u32>, page_token: Option<&str>) -> Result<RunListResponse, ApiError> {
        self.api_client.list_runs(page_size, page_token).await
    }

    /// Submit a run and return its id.
    pub async fn run_workflow(&self, request: &RunRequest) -> Result<RunId, ApiError> {
        if request.workflow_url.trim().is_empty() {
            return Err(ApiError::invalid_service("run request has no workflow_url"));
        }
        let run = self.api_client.run_workflow(request).await?;
        info!(run_id = %run.run_id, workflow_url = %request.workflow_url, "submitted workflow run");
        Ok(run)
    }

    pub async fn get_run_log(&self, run_id: &str) -> Result<RunLog, ApiError> {
        self.api_client.get_run_log(run_id).await
    }

    pub async fn get_run_status(&self, run_id: &str) -> Result<RunStatus, ApiError> {
        self.api_client.get_run_status(run_id).await
    }

    pub async fn cancel_run(&self, run_id: &str) -> Result<RunId, ApiError> {
        self.api_client.cancel_run(run_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use wfinterop_types::State;

    use super::*;

    #[derive(Default)]
    struct FakeWes {
        submitted: Mutex<Vec<RunRequest>>,
    }

    #[async_trait::async_trait]
    impl WesApi for FakeWes {
        async fn service_info(&self) -> Result<ServiceInfo, ApiError> {
            Ok(ServiceInfo {
                supported_wes_versions: vec!["1.0.0".into()],
                ..Default::default()
            })
        }

        async fn list_runs(&self, _page_size: Option<u32>, _page_token: Option<&str>) -> Result<RunListResponse, ApiError> {
            Ok(RunListResponse::default())
        }

        async fn run_workflow(&self, request: &RunRequest) -> Result<RunId, ApiError> {
            self.submitted.lock().unwrap().push(request.clone());
            Ok(RunId { run_id: "run-1".into() })
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
                state: State::Running,
            })
        }

        async fn cancel_run(&self, run_id: &str) -> Result<RunId, ApiError> {
            Ok(RunId { run_id: run_id.into() })
        }
    }

    fn request() -> RunRequest {
        RunRequest {
            workflow_params: json!({"input_file": "md5sum.input"}),
            workflow_type: "CWL".into(),
            workflow_type_version: "v1.0".into(),
            workflow_url: "https://example.org/md5sum.cwl".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn run_workflow_forwards_request() {
        let api = Arc::new(FakeWes::default());
        let wes = Wes::new(api.clone());

        let run = wes.run_workflow(&request()).await.unwrap();
        assert_eq!(run.run_id, "run-1");
        assert_eq!(api.submitted.lock().unwrap().as_slice(), &[request()]);
    }

    #[tokio::test]
    async fn run_workflow_requires_workflow_url() {
        let api = Arc::new(FakeWes::default());
        let wes = Wes::new(api.clone());

        let err = wes
            .run_workflow(&RunRequest {
                workflow_url: " ".into(),
                ..request()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidService { .. }));
        assert!(api.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_and_cancel_pass_run_id_through() {
        let wes = Wes::new(Arc::new(FakeWes::default()));
        assert_eq!(wes.get_run_status("abc").await.unwrap().state, State::Running);
        assert_eq!(wes.cancel_run("abc").await.unwrap().run_id, "abc");
        assert_eq!(wes.get_run_log("abc").await.unwrap().run_id, "abc");
        assert_eq!(wes.get_service_info().await.unwrap().supported_wes_versions, vec!["1.0.0".to_string()]);
    }

    #[test]
    fn from_config_requires_service_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.yaml"));
        let err = Wes::from_config(&store, "local").err().expect("missing service");
        assert!(matches!(err, ApiError::Config(_)));
    }
}
