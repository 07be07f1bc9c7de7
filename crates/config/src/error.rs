use std::path::PathBuf;

use thiserror::Error;
use wfinterop_types::{EntryKindMismatch, Section};

use crate::ValidationError;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to {action} config file {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("no entry '{key}' in section '{section}'")]
    NotFound { section: Section, key: String },

    #[error(transparent)]
    EntryKindMismatch(#[from] EntryKindMismatch),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(section: Section, key: impl Into<String>) -> Self {
        Self::NotFound { section, key: key.into() }
    }
}
