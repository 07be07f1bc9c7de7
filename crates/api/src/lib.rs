//! GA4GH API clients for wfinterop.
//!
//! This crate talks to the two services a queue refers to:
//!
//! - a Tool Registry Service (TRS), to discover workflows and fetch their
//!   descriptors, through [`Trs`];
//! - a Workflow Execution Service (WES), to submit and inspect runs, through
//!   [`Wes`].
//!
//! Both wrap a trait object ([`TrsApi`], [`WesApi`]) so callers and tests can
//! substitute the HTTP implementation. Connection settings come from the
//! `toolregistries` and `workflowservices` sections of the configuration.
//!
//! # Example
//!
//! ```ignore
//! use wfinterop_api::Trs;
//! use wfinterop_config::ConfigStore;
//!
//! async fn show_versions(store: &ConfigStore) -> Result<(), wfinterop_api::ApiError> {
//!     let trs = Trs::from_config(store, "dockstore")?;
//!     for version in trs.get_workflow_versions("github.com/ga4gh/md5sum").await? {
//!         println!("{}", version.id);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod response;
pub mod trs;
pub mod wes;

pub use client::{AuthScheme, ServiceClient, build_base_url};
pub use error::ApiError;
pub use trs::{HttpTrsClient, TRS_BASE_PATH, Trs, TrsApi};
pub use wes::{HttpWesClient, WES_BASE_PATH, Wes, WesApi};
