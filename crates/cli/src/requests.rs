//! Payloads accepted by `config add-*` through `--data`.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use wfinterop_types::{QueueEntry, ServiceEntry};

/// Parse a `--data` value. YAML is accepted, which covers JSON as well.
pub fn parse_data<T: DeserializeOwned>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).context("could not parse --data as YAML or JSON")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueRequest {
    pub workflow_id: String,
    pub version_id: String,
    pub workflow_type: String,
    #[serde(default)]
    pub trs_id: Option<String>,
    #[serde(default)]
    pub wes_default: Option<String>,
    #[serde(default)]
    pub wes_opts: Option<Vec<String>>,
}

impl QueueRequest {
    /// Fields left out keep the [`QueueEntry::new`] defaults; `wes_opts`
    /// stays `[local]` even when `wes_default` names another service.
    pub fn into_entry(self) -> QueueEntry {
        let mut entry = QueueEntry::new(self.workflow_id, self.version_id, self.workflow_type);
        if let Some(trs_id) = self.trs_id {
            entry = entry.with_trs_id(trs_id);
        }
        if let Some(wes_default) = self.wes_default {
            entry = entry.with_wes_default(wes_default);
        }
        if let Some(wes_opts) = self.wes_opts {
            entry = entry.with_wes_opts(wes_opts);
        }
        entry
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceRequest {
    pub service: String,
    #[serde(default)]
    pub auth: String,
    #[serde(default)]
    pub auth_type: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub proto: String,
}

impl ServiceRequest {
    pub fn into_entry(self) -> (String, ServiceEntry) {
        let entry = ServiceEntry::new(self.host, self.proto).with_auth(self.auth, self.auth_type);
        (self.service, entry)
    }
}
