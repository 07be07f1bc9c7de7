//! Checks applied before an entry is written.
//!
//! Loading only enforces the document structure, and entries themselves are
//! written as given. The one rule is that an entry needs a non-empty key.

use thiserror::Error;

/// Validate an identifier used as a key inside a section.
///
/// Any non-empty string is accepted, including one with spaces.
pub fn validate_entry_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }
    Ok(())
}

/// Errors that can occur during validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("entry identifier cannot be empty")]
    EmptyKey,
}
