//! Tool Registry Service client.
//!
//! [`TrsApi`] mirrors the TRS v2 REST operations one-to-one and expects
//! identifiers exactly as they go on the wire. [`Trs`] is the interface the
//! rest of wfinterop uses: it accepts bare workflow ids and formats them
//! (`#workflow/<id>`, percent-encoded) before delegating.

use std::sync::Arc;

use reqwest::Method;
use tracing::debug;
use wfinterop_config::ConfigStore;
use wfinterop_types::{FileWrapper, Metadata, ServiceEntry, Tool, ToolFile, ToolVersion};
use wfinterop_util::format_workflow_id;
use wfinterop_util::http::{encode_path_segment, encode_relative_path};

use crate::{ApiError, ServiceClient};

/// Path under the registry host where the TRS v2 API is served.
pub const TRS_BASE_PATH: &str = "/api/ga4gh/v2";

/// Raw TRS operations. `id` arguments are already formatted and encoded.
#[async_trait::async_trait]
pub trait TrsApi: Send + Sync {
    async fn metadata_get(&self) -> Result<Metadata, ApiError>;

    async fn tools_id_get(&self, id: &str) -> Result<Tool, ApiError>;

    async fn tools_id_versions_get(&self, id: &str) -> Result<Vec<ToolVersion>, ApiError>;

    async fn descriptor_get(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<FileWrapper, ApiError>;

    async fn descriptor_relative_path_get(
        &self,
        id: &str,
        version_id: &str,
        descriptor_type: &str,
        relative_path: &str,
    ) -> Result<FileWrapper, ApiError>;

    async fn tests_get(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<Vec<FileWrapper>, ApiError>;

    async fn files_get(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<Vec<ToolFile>, ApiError>;
}

/// [`TrsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTrsClient {
    client: ServiceClient,
}

impl HttpTrsClient {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn from_entry(entry: &ServiceEntry) -> Result<Self, ApiError> {
        Ok(Self::new(ServiceClient::from_entry(entry, TRS_BASE_PATH)?))
    }

    pub fn base_url(&self) -> &str {
        &self.client.base_url
    }
}

fn version_path(id: &str, version_id: &str, descriptor_type: &str) -> String {
    format!(
        "/tools/{id}/versions/{}/{}",
        encode_path_segment(version_id),
        encode_path_segment(descriptor_type)
    )
}

#[async_trait::async_trait]
impl TrsApi for HttpTrsClient {
    async fn metadata_get(&self) -> Result<Metadata, ApiError> {
        self.client.get("/metadata").await
    }

    async fn tools_id_get(&self, id: &str) -> Result<Tool, ApiError> {
        self.client.get(&format!("/tools/{id}")).await
    }

    async fn tools_id_versions_get(&self, id: &str) -> Result<Vec<ToolVersion>, ApiError> {
        self.client.get(&format!("/tools/{id}/versions")).await
    }

    async fn descriptor_get(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<FileWrapper, ApiError> {
        let path = format!("{}/descriptor", version_path(id, version_id, descriptor_type));
        self.client.get(&path).await
    }

    async fn descriptor_relative_path_get(
        &self,
        id: &str,
        version_id: &str,
        descriptor_type: &str,
        relative_path: &str,
    ) -> Result<FileWrapper, ApiError> {
        let path = format!(
            "{}/descriptor/{}",
            version_path(id, version_id, descriptor_type),
            encode_relative_path(relative_path)
        );
        self.client.get(&path).await
    }

    async fn tests_get(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<Vec<FileWrapper>, ApiError> {
        let path = format!("{}/tests", version_path(id, version_id, descriptor_type));
        self.client.get(&path).await
    }

    async fn files_get(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<Vec<ToolFile>, ApiError> {
        let path = format!("{}/files", version_path(id, version_id, descriptor_type));
        self.client.send(Method::GET, &path, |builder| builder.query(&[("format", "JSON")])).await
    }
}

/// Workflow-oriented view of a tool registry.
#[derive(Clone)]
pub struct Trs {
    api_client: Arc<dyn TrsApi>,
}

impl Trs {
    pub fn new(api_client: Arc<dyn TrsApi>) -> Self {
        Self { api_client }
    }

    /// Build an HTTP-backed instance from the `toolregistries` entry `trs_id`.
    pub fn from_config(store: &ConfigStore, trs_id: &str) -> Result<Self, ApiError> {
        let entry = store.tool_registry(trs_id)?;
        let client = HttpTrsClient::from_entry(&entry)?;
        debug!(trs_id, base_url = client.base_url(), "loaded TRS client");
        Ok(Self::new(Arc::new(client)))
    }

    /// Metadata describing the registry itself.
    pub async fn get_metadata(&self) -> Result<Metadata, ApiError> {
        self.api_client.metadata_get().await
    }

    /// One workflow, with its versions nested inside.
    pub async fn get_workflow(&self, id: &str) -> Result<Tool, ApiError> {
        let id = format_workflow_id(id);
        self.api_client.tools_id_get(&id).await
    }

    pub async fn get_workflow_versions(&self, id: &str) -> Result<Vec<ToolVersion>, ApiError> {
        let id = format_workflow_id(id);
        self.api_client.tools_id_versions_get(&id).await
    }

    /// The primary descriptor (CWL, WDL, Nextflow...) of a workflow version.
    pub async fn get_workflow_descriptor(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<FileWrapper, ApiError> {
        let id = format_workflow_id(id);
        self.api_client.descriptor_get(&id, version_id, descriptor_type).await
    }

    /// An additional descriptor file, addressed relative to the primary one.
    pub async fn get_workflow_descriptor_relative(
        &self,
        id: &str,
        version_id: &str,
        descriptor_type: &str,
        relative_path: &str,
    ) -> Result<FileWrapper, ApiError> {
        let id = format_workflow_id(id);
        self.api_client
            .descriptor_relative_path_get(&id, version_id, descriptor_type, relative_path)
            .await
    }

    /// Test parameter files that run the workflow successfully.
    pub async fn get_workflow_tests(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<Vec<FileWrapper>, ApiError> {
        let id = format_workflow_id(id);
        self.api_client.tests_get(&id, version_id, descriptor_type).await
    }

    pub async fn get_workflow_files(&self, id: &str, version_id: &str, descriptor_type: &str) -> Result<Vec<ToolFile>, ApiError> {
        let id = format_workflow_id(id);
        self.api_client.files_get(&id, version_id, descriptor_type).await
    }
}
