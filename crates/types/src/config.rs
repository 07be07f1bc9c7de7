//! Data model for the wfinterop configuration file.
//!
//! The file holds three fixed sections. Each maps an identifier to a typed
//! entry:
//!
//! ```yaml
//! queues:
//!   mock_wf__develop:
//!     workflow_id: mock_wf
//!     version_id: develop
//!     workflow_type: CWL
//!     trs_id: dockstore
//!     wes_default: local
//!     wes_opts: [local]
//! toolregistries:
//!   dockstore: { auth: '', auth_type: '', host: dockstore.org, proto: https }
//! workflowservices:
//!   local: { auth: '', auth_type: '', host: 'localhost:8080', proto: http }
//! ```

use std::{error::Error, fmt, str::FromStr};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};

/// Tool registry used by queues that do not name one.
pub const DEFAULT_TRS_ID: &str = "dockstore";

/// Execution service used by queues that do not name one.
pub const DEFAULT_WES_ID: &str = "local";

/// One of the three top-level keys of the configuration document.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Queues,
    ToolRegistries,
    WorkflowServices,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Queues, Section::ToolRegistries, Section::WorkflowServices];

    /// The key used for this section in the YAML document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queues => "queues",
            Self::ToolRegistries => "toolregistries",
            Self::WorkflowServices => "workflowservices",
        }
    }

    /// Whether this section stores [`ServiceEntry`] values.
    pub fn holds_services(&self) -> bool {
        !matches!(self, Self::Queues)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ParseSectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queues" => Ok(Self::Queues),
            "toolregistries" => Ok(Self::ToolRegistries),
            "workflowservices" => Ok(Self::WorkflowServices),
            other => Err(ParseSectionError { name: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSectionError {
    pub name: String,
}

impl fmt::Display for ParseSectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown config section '{}'; expected one of queues, toolregistries, workflowservices",
            self.name
        )
    }
}

impl Error for ParseSectionError {}

/// Builds the composite identifier under which a queue is stored.
pub fn queue_key(workflow_id: &str, version_id: &str) -> String {
    format!("{workflow_id}__{version_id}")
}

/// A workflow + version + execution targets tuple the orchestrator runs against.
///
/// Fields absent from the file stay absent when the document is written back,
/// so `wf1: {}` round-trips unchanged. Accessors read a missing field as an
/// empty value; the `dockstore`/`local` defaults only apply through
/// [`QueueEntry::new`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trs_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wes_default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wes_opts: Option<IndexSet<String>>,
}

impl QueueEntry {
    /// Create a queue targeting the default registry and execution service.
    pub fn new(workflow_id: impl Into<String>, version_id: impl Into<String>, workflow_type: impl Into<String>) -> Self {
        Self {
            workflow_id: Some(workflow_id.into()),
            version_id: Some(version_id.into()),
            workflow_type: Some(workflow_type.into()),
            trs_id: Some(DEFAULT_TRS_ID.to_string()),
            wes_default: Some(DEFAULT_WES_ID.to_string()),
            wes_opts: Some(IndexSet::from([DEFAULT_WES_ID.to_string()])),
        }
    }

    pub fn with_trs_id(mut self, trs_id: impl Into<String>) -> Self {
        self.trs_id = Some(trs_id.into());
        self
    }

    pub fn with_wes_default(mut self, wes_default: impl Into<String>) -> Self {
        self.wes_default = Some(wes_default.into());
        self
    }

    /// Replace the allowed execution services. Duplicates collapse, first
    /// occurrence keeps its position.
    pub fn with_wes_opts<I, S>(mut self, wes_opts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wes_opts = Some(wes_opts.into_iter().map(Into::into).collect());
        self
    }

    /// Fill every missing field with an empty value, so all six keys are
    /// written.
    pub fn with_all_fields(mut self) -> Self {
        for field in [
            &mut self.workflow_id,
            &mut self.version_id,
            &mut self.workflow_type,
            &mut self.trs_id,
            &mut self.wes_default,
        ] {
            field.get_or_insert_with(String::new);
        }
        self.wes_opts.get_or_insert_with(IndexSet::new);
        self
    }

    pub fn workflow_id(&self) -> &str {
        self.workflow_id.as_deref().unwrap_or_default()
    }

    pub fn version_id(&self) -> &str {
        self.version_id.as_deref().unwrap_or_default()
    }

    pub fn workflow_type(&self) -> &str {
        self.workflow_type.as_deref().unwrap_or_default()
    }

    pub fn trs_id(&self) -> &str {
        self.trs_id.as_deref().unwrap_or_default()
    }

    pub fn wes_default(&self) -> &str {
        self.wes_default.as_deref().unwrap_or_default()
    }

    /// Allowed execution services in file order.
    pub fn wes_opts(&self) -> impl Iterator<Item = &str> {
        self.wes_opts.iter().flatten().map(String::as_str)
    }

    /// The identifier this queue is stored under.
    pub fn key(&self) -> String {
        queue_key(self.workflow_id(), self.version_id())
    }

    /// Whether `wes_id` is one of the execution services this queue may use.
    pub fn allows_wes(&self, wes_id: &str) -> bool {
        self.wes_opts.as_ref().is_some_and(|opts| opts.contains(wes_id))
    }
}

/// Connection settings for a tool registry or workflow execution service.
///
/// Like [`QueueEntry`], absent fields are kept absent on write and read as
/// empty strings through the accessors.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<String>,
}

impl ServiceEntry {
    /// An entry with every field set; `auth` and `auth_type` start empty.
    pub fn new(host: impl Into<String>, proto: impl Into<String>) -> Self {
        Self {
            auth: Some(String::new()),
            auth_type: Some(String::new()),
            host: Some(host.into()),
            proto: Some(proto.into()),
        }
    }

    pub fn with_auth(mut self, auth: impl Into<String>, auth_type: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self.auth_type = Some(auth_type.into());
        self
    }

    /// Fill every missing field with an empty string, so all four keys are
    /// written.
    pub fn with_all_fields(mut self) -> Self {
        for field in [&mut self.auth, &mut self.auth_type, &mut self.host, &mut self.proto] {
            field.get_or_insert_with(String::new);
        }
        self
    }

    pub fn auth(&self) -> &str {
        self.auth.as_deref().unwrap_or_default()
    }

    pub fn auth_type(&self) -> &str {
        self.auth_type.as_deref().unwrap_or_default()
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or_default()
    }

    pub fn proto(&self) -> &str {
        self.proto.as_deref().unwrap_or_default()
    }
}

/// The unit written by an upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionEntry {
    Queue(QueueEntry),
    Service(ServiceEntry),
}

impl SectionEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Queue(_) => "queue",
            Self::Service(_) => "service",
        }
    }
}

impl From<QueueEntry> for SectionEntry {
    fn from(entry: QueueEntry) -> Self {
        Self::Queue(entry)
    }
}

impl From<ServiceEntry> for SectionEntry {
    fn from(entry: ServiceEntry) -> Self {
        Self::Service(entry)
    }
}

/// Raised when an entry is written to a section that stores the other kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryKindMismatch {
    pub section: Section,
    pub kind: &'static str,
}

impl fmt::Display for EntryKindMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section '{}' cannot hold a {} entry", self.section, self.kind)
    }
}

impl Error for EntryKindMismatch {}

/// The whole persisted configuration.
///
/// All three sections are always present; a section missing from the file,
/// or written as a bare key (`queues:`), reads as empty. Unknown top-level
/// keys fail deserialization.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub queues: IndexMap<String, QueueEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub toolregistries: IndexMap<String, ServiceEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub workflowservices: IndexMap<String, ServiceEntry>,
}

impl ConfigDocument {
    /// Service entries for `section`, or `None` for the queues section.
    pub fn services(&self, section: Section) -> Option<&IndexMap<String, ServiceEntry>> {
        match section {
            Section::Queues => None,
            Section::ToolRegistries => Some(&self.toolregistries),
            Section::WorkflowServices => Some(&self.workflowservices),
        }
    }

    /// Identifiers stored in `section`, in file order.
    pub fn keys(&self, section: Section) -> Vec<&str> {
        match section {
            Section::Queues => self.queues.keys().map(String::as_str).collect(),
            Section::ToolRegistries => self.toolregistries.keys().map(String::as_str).collect(),
            Section::WorkflowServices => self.workflowservices.keys().map(String::as_str).collect(),
        }
    }

    /// Set `self[section][key] = entry`, replacing any previous entry whole.
    ///
    /// Returns `true` when an existing entry was replaced.
    pub fn insert(&mut self, section: Section, key: impl Into<String>, entry: SectionEntry) -> Result<bool, EntryKindMismatch> {
        let key = key.into();
        let replaced = match (section, entry) {
            (Section::Queues, SectionEntry::Queue(queue)) => self.queues.insert(key, queue).is_some(),
            (Section::ToolRegistries, SectionEntry::Service(service)) => self.toolregistries.insert(key, service).is_some(),
            (Section::WorkflowServices, SectionEntry::Service(service)) => self.workflowservices.insert(key, service).is_some(),
            (section, entry) => {
                return Err(EntryKindMismatch {
                    section,
                    kind: entry.kind(),
                });
            }
        };
        Ok(replaced)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
