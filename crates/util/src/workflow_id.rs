//! TRS identifiers for workflows.
//!
//! TRS addresses workflows as `#workflow/<id>` and expects the whole
//! identifier to be a single, percent-encoded path segment.

use percent_encoding::percent_decode_str;

use crate::http::encode_path_segment;

/// Prefix TRS uses to tell workflows apart from tools.
pub const WORKFLOW_PREFIX: &str = "#workflow";

/// Prefix a bare workflow id with `#workflow/` and encode it for a URL path.
///
/// The input is percent-decoded first and the prefix is only added when
/// missing, so bare, prefixed and already-encoded ids all produce the same
/// result. Spaces encode as `+`, every other reserved byte as `%XX`.
pub fn format_workflow_id(id: &str) -> String {
    let decoded = percent_decode_str(id).decode_utf8_lossy();
    if decoded.starts_with(WORKFLOW_PREFIX) {
        quote_plus(&decoded)
    } else {
        quote_plus(&format!("{WORKFLOW_PREFIX}/{decoded}"))
    }
}

fn quote_plus(value: &str) -> String {
    value
        .split(' ')
        .map(encode_path_segment)
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::format_workflow_id;

    #[test]
    fn bare_id_gets_prefixed_and_encoded() {
        assert_eq!(format_workflow_id("foo"), "%23workflow%2Ffoo");
    }

    #[test]
    fn prefixed_id_is_only_encoded() {
        assert_eq!(format_workflow_id("#workflow/foo"), "%23workflow%2Ffoo");
    }

    #[test]
    fn encoded_id_is_stable() {
        let once = format_workflow_id("github.com/ga4gh/dockstore-tool-md5sum");
        assert_eq!(once, "%23workflow%2Fgithub.com%2Fga4gh%2Fdockstore-tool-md5sum");
        assert_eq!(format_workflow_id(&once), once);
    }

    #[test]
    fn spaces_encode_as_plus() {
        assert_eq!(format_workflow_id("my wf"), "%23workflow%2Fmy+wf");
    }
}
