//! Reading and writing the configuration file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use wfinterop_types::ConfigDocument;
use wfinterop_util::config_file_path;

use crate::ConfigError;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "WFINTEROP_CONFIG_PATH";

/// File name of the configuration inside the wfinterop config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Returns the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    config_file_path(CONFIG_PATH_ENV, CONFIG_FILE_NAME)
}

/// Load the document at `path`.
///
/// A missing file, or one holding only whitespace and comments, yields an
/// empty document. Anything that is not a valid document fails with
/// [`ConfigError::Parse`].
pub fn load_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found; using empty document");
            return Ok(ConfigDocument::default());
        }
        Err(error) => return Err(ConfigError::io("read", path, error)),
    };

    let document = parse_document(&content).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(
        path = %path.display(),
        queues = document.queues.len(),
        toolregistries = document.toolregistries.len(),
        workflowservices = document.workflowservices.len(),
        "loaded config"
    );
    Ok(document)
}

/// Serialize `document` and replace the file at `path` with it.
///
/// The content goes to a sibling temporary file first and is then renamed over
/// the target. The parent directory must already exist.
pub fn save_document(document: &ConfigDocument, path: &Path) -> Result<(), ConfigError> {
    let content = serde_yaml::to_string(document)?;
    write_atomic(path, &content)?;
    debug!(path = %path.display(), bytes = content.len(), "wrote config");
    Ok(())
}

fn parse_document(content: &str) -> Result<ConfigDocument, String> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content).map_err(format_yaml_error)?;
    if raw.is_null() {
        return Ok(ConfigDocument::default());
    }
    serde_yaml::from_str(content).map_err(format_yaml_error)
}

fn format_yaml_error(error: serde_yaml::Error) -> String {
    if let Some(location) = error.location() {
        return format!("line {}, column {}: {}", location.line(), location.column(), error);
    }
    error.to_string()
}

fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let temporary_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|extension| extension.to_str()).unwrap_or("yaml")
    ));
    fs::write(&temporary_path, content).map_err(|error| ConfigError::io("write", &temporary_path, error))?;
    if let Err(error) = fs::rename(&temporary_path, path) {
        let _ = fs::remove_file(&temporary_path);
        return Err(ConfigError::io("replace", path, error));
    }
    Ok(())
}
