use std::env;
use std::path::PathBuf;

use dirs_next::{config_dir, home_dir};

/// Directory under the platform config dir that holds wfinterop files.
pub const APP_DIR_NAME: &str = "wfinterop";

pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    if let Some(rest) = p.strip_prefix("~\\") {
        // Windows-style
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Resolve the location of a wfinterop file.
///
/// A non-blank value of `env_var` wins (with `~` expanded); otherwise the
/// file lives at `<config dir>/wfinterop/<file_name>`, falling back to the
/// current directory when the platform has no config dir.
pub fn config_file_path(env_var: &str, file_name: &str) -> PathBuf {
    if let Ok(path) = env::var(env_var)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR_NAME).join(file_name)
}
