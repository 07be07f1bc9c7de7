//! The configuration store handle.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};
use wfinterop_types::{ConfigDocument, QueueEntry, Section, SectionEntry, ServiceEntry};
use wfinterop_util::redact_sensitive;

use crate::{ConfigError, default_config_path, load_document, save_document, validate_entry_key};

/// Handle to a configuration file.
///
/// Every operation reads the file afresh; mutations rewrite it whole. Two
/// processes upserting at the same time race and the last write wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    create_parent: bool,
}

impl ConfigStore {
    /// A store backed by `path`. The file does not need to exist yet, but
    /// its parent directory must by the time something is written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_parent: false,
        }
    }

    /// A store at [`default_config_path`]. The containing directory is
    /// created on the first write, so reads leave the filesystem untouched.
    pub fn from_default_path() -> Self {
        Self {
            create_parent: true,
            ..Self::new(default_config_path())
        }
    }

    /// Path to the underlying YAML file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ConfigDocument, ConfigError> {
        load_document(&self.path)
    }

    /// The mapping stored under `section`, empty when the file or the
    /// section is absent.
    pub fn get_section(&self, section: Section) -> Result<Mapping, ConfigError> {
        let document = self.load()?;
        let value = match section {
            Section::Queues => serde_yaml::to_value(&document.queues)?,
            Section::ToolRegistries => serde_yaml::to_value(&document.toolregistries)?,
            Section::WorkflowServices => serde_yaml::to_value(&document.workflowservices)?,
        };
        match value {
            Value::Mapping(mapping) => Ok(mapping),
            _ => Ok(Mapping::new()),
        }
    }

    pub fn queues(&self) -> Result<IndexMap<String, QueueEntry>, ConfigError> {
        Ok(self.load()?.queues)
    }

    pub fn tool_registries(&self) -> Result<IndexMap<String, ServiceEntry>, ConfigError> {
        Ok(self.load()?.toolregistries)
    }

    pub fn workflow_services(&self) -> Result<IndexMap<String, ServiceEntry>, ConfigError> {
        Ok(self.load()?.workflowservices)
    }

    /// Look up a single queue by its `<workflow_id>__<version_id>` key.
    pub fn queue(&self, queue_id: &str) -> Result<QueueEntry, ConfigError> {
        self.load()?
            .queues
            .shift_remove(queue_id)
            .ok_or_else(|| ConfigError::not_found(Section::Queues, queue_id))
    }

    pub fn tool_registry(&self, service: &str) -> Result<ServiceEntry, ConfigError> {
        self.service(Section::ToolRegistries, service)
    }

    pub fn workflow_service(&self, service: &str) -> Result<ServiceEntry, ConfigError> {
        self.service(Section::WorkflowServices, service)
    }

    fn service(&self, section: Section, service: &str) -> Result<ServiceEntry, ConfigError> {
        self.load()?
            .services(section)
            .and_then(|services| services.get(service).cloned())
            .ok_or_else(|| ConfigError::not_found(section, service))
    }

    /// Set `document[section][key] = entry` and rewrite the file.
    ///
    /// An existing entry under `key` is replaced whole; nothing is merged.
    pub fn upsert(&self, section: Section, key: &str, entry: impl Into<SectionEntry>) -> Result<(), ConfigError> {
        validate_entry_key(key)?;
        let mut document = self.load()?;
        let replaced = document.insert(section, key, entry.into())?;
        self.ensure_parent_dir()?;
        save_document(&document, &self.path)?;
        info!(%section, key, replaced, path = %self.path.display(), "saved config entry");
        Ok(())
    }

    /// Store a queue under `<workflow_id>__<version_id>` and return that key.
    ///
    /// Every queue field is written, with absent ones as empty strings.
    pub fn add_queue(&self, entry: QueueEntry) -> Result<String, ConfigError> {
        let entry = entry.with_all_fields();
        let key = entry.key();
        debug!(key = %key, trs_id = entry.trs_id(), wes_default = entry.wes_default(), "adding queue");
        self.upsert(Section::Queues, &key, entry)?;
        Ok(key)
    }

    /// Store a TRS entry with all four fields written.
    pub fn add_tool_registry(&self, service: &str, entry: ServiceEntry) -> Result<(), ConfigError> {
        let entry = entry.with_all_fields();
        log_service_entry(Section::ToolRegistries, service, &entry);
        self.upsert(Section::ToolRegistries, service, entry)
    }

    pub fn add_workflow_service(&self, service: &str, entry: ServiceEntry) -> Result<(), ConfigError> {
        let entry = entry.with_all_fields();
        log_service_entry(Section::WorkflowServices, service, &entry);
        self.upsert(Section::WorkflowServices, service, entry)
    }

    /// The full document rendered as YAML. Sections that are empty are still
    /// listed.
    pub fn show(&self) -> Result<String, ConfigError> {
        let document = self.load()?;
        Ok(serde_yaml::to_string(&document)?)
    }

    fn ensure_parent_dir(&self) -> Result<(), ConfigError> {
        if !self.create_parent {
            return Ok(());
        }
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                fs::create_dir_all(parent).map_err(|error| ConfigError::io("create directory for", &self.path, error))?;
                debug!(dir = %parent.display(), "created config directory");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn log_service_entry(section: Section, service: &str, entry: &ServiceEntry) {
    let summary = format!(
        "host={} proto={} auth_type={} auth={}",
        entry.host(),
        entry.proto(),
        entry.auth_type(),
        entry.auth()
    );
    debug!(%section, service, entry = %redact_sensitive(&summary), "adding service");
}
