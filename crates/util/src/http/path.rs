use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes emitted as-is in a path segment: RFC3986 unreserved (`A-Z a-z 0-9 - . _ ~`).
pub const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes a single path segment, uppercase hex for every reserved byte.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Encodes each `/`-separated part of a relative path while keeping the separators.
pub fn encode_relative_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(encode_path_segment)
        .collect::<Vec<_>>()
        .join("/")
}
