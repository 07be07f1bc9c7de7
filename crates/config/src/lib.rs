//! Configuration management for wfinterop.
//!
//! The configuration lives in a single YAML file (by default
//! `~/.config/wfinterop/config.yaml`) with three sections: `queues`,
//! `toolregistries` and `workflowservices`. [`ConfigStore`] is the handle
//! every command goes through; it reads the whole document, applies one
//! change and rewrites the file.

mod error;
mod io;
mod store;
mod validation;

pub use error::ConfigError;
pub use io::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, default_config_path, load_document, save_document};
pub use store::ConfigStore;
pub use validation::{ValidationError, validate_entry_key};
pub use wfinterop_types::config::{ConfigDocument, QueueEntry, Section, SectionEntry, ServiceEntry};
