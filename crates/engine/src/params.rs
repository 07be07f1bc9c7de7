//! Workflow parameter files.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::OrchestratorError;

/// File extensions picked up from a parameters directory.
pub const PARAMS_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Load one parameters file.
///
/// JSON and YAML are both read with the YAML parser. An empty file is an
/// empty parameter set; anything other than a mapping is rejected.
///
/// ```rust
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("md5sum.yaml");
/// std::fs::write(&path, "input_file:\n  class: File\n  path: md5sum.input\n")?;
///
/// let params = wfinterop_engine::load_params_file(&path)?;
/// assert_eq!(params["input_file"]["class"], "File");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_params_file(path: impl AsRef<Path>) -> Result<Value, OrchestratorError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| OrchestratorError::ParamsIo {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_yaml::from_str(&content).map_err(|error| OrchestratorError::ParamsParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err(OrchestratorError::ParamsParse {
            path: path.to_path_buf(),
            message: "expected a mapping of workflow inputs".to_string(),
        }),
    }
}

/// Load every parameters file in `dir`, sorted by file name.
///
/// Each job is labelled with its file name. Subdirectories and files with
/// other extensions are skipped.
pub fn load_params_dir(dir: impl AsRef<Path>) -> Result<Vec<(String, Value)>, OrchestratorError> {
    let dir = dir.as_ref();
    let io_error = |source| OrchestratorError::ParamsIo {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let has_params_extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| PARAMS_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()));
        if path.is_file() && has_params_extension {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = files.len(), "found parameter files");

    files
        .into_iter()
        .map(|path| {
            let label = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((label, load_params_file(&path)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_loaded_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.yml"), "sample: b\n").unwrap();
        fs::write(dir.path().join("a.json"), r#"{"sample": "a"}"#).unwrap();
        fs::write(dir.path().join("c.YAML"), "sample: c\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not params").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let jobs = load_params_dir(dir.path()).unwrap();
        let labels: Vec<&str> = jobs.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["a.json", "b.yml", "c.YAML"]);
        assert_eq!(jobs[0].1["sample"], "a");
        assert_eq!(jobs[2].1["sample"], "c");
    }

    #[test]
    fn empty_file_is_empty_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_params_file(&path).unwrap(), Value::Object(Map::new()));
    }

    #[test]
    fn non_mapping_params_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();
        let err = load_params_file(&path).unwrap_err();
        assert!(matches!(err, OrchestratorError::ParamsParse { .. }));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_params_dir(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, OrchestratorError::ParamsIo { .. }));
    }
}
