//! Helpers shared by the wfinterop crates.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod http;
mod path_processing;
mod workflow_id;

pub use path_processing::{APP_DIR_NAME, config_file_path, expand_tilde};
pub use workflow_id::{WORKFLOW_PREFIX, format_workflow_id};

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+ ]+)",
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD|AUTH)[:=] ?)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in SENSITIVE_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::redact_sensitive;

    #[test]
    fn redacts_authorization_header_values() {
        let line = "authorization: Bearer abc.def-123";
        assert_eq!(redact_sensitive(line), "authorization: <redacted>");
    }

    #[test]
    fn redacts_key_value_secrets() {
        let line = "host=dockstore.org auth=s3cr3t API_TOKEN=xyz";
        let redacted = redact_sensitive(line);
        assert!(redacted.contains("host=dockstore.org"));
        assert!(!redacted.contains("s3cr3t"));
        assert!(!redacted.contains("xyz"));
    }
}
