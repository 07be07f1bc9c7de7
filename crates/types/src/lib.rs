//! Shared type definitions for wfinterop.
//!
//! - [`config`]: the persisted configuration document and its entries.
//! - [`trs`]: GA4GH Tool Registry Service payloads.
//! - [`wes`]: GA4GH Workflow Execution Service payloads.

pub mod config;
pub mod trs;
pub mod wes;

pub use config::{
    ConfigDocument, DEFAULT_TRS_ID, DEFAULT_WES_ID, EntryKindMismatch, ParseSectionError, QueueEntry, Section, SectionEntry, ServiceEntry,
    queue_key,
};
pub use trs::{FileType, FileWrapper, Metadata, Tool, ToolClass, ToolFile, ToolVersion};
pub use wes::{Log, RunId, RunListResponse, RunLog, RunRequest, RunStatus, ServiceInfo, State, WorkflowTypeVersion};
