//! # wfinterop engine
//!
//! Turns a configured queue (workflow, version, registry and allowed
//! execution services) into WES run submissions.
//!
//! - **`connector`**: builds TRS/WES clients from configuration entries
//! - **`orchestrator`**: single and batch submissions, run status
//! - **`params`**: loading workflow parameter files

mod connector;
mod error;
mod orchestrator;
mod params;

pub use connector::{HttpConnector, ServiceConnector};
pub use error::OrchestratorError;
pub use orchestrator::{JobOutcome, Orchestrator, RunSubmission};
pub use params::{PARAMS_EXTENSIONS, load_params_dir, load_params_file};
