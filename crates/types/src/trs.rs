//! GA4GH Tool Registry Service (v2) payloads.
//!
//! Only the fields wfinterop reads are modelled; everything else in a
//! response is ignored. Older beta field names are accepted as aliases.

use serde::{Deserialize, Serialize};

/// Service description returned by `GET /metadata`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub version: String,
    pub api_version: String,
    pub country: Option<String>,
    pub friendly_name: Option<String>,
}

/// Describes a class (type) of tool, e.g. "Workflow" or "CommandLineTool".
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolClass {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A tool (or workflow) with its nested versions.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tool {
    pub url: String,
    pub id: String,
    pub aliases: Vec<String>,
    pub organization: String,
    #[serde(alias = "toolname")]
    pub name: Option<String>,
    pub toolclass: Option<ToolClass>,
    pub description: Option<String>,
    pub meta_version: Option<String>,
    pub has_checker: Option<bool>,
    pub checker_url: Option<String>,
    pub versions: Vec<ToolVersion>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolVersion {
    pub id: String,
    pub url: String,
    pub name: Option<String>,
    pub descriptor_type: Vec<String>,
    pub is_production: Option<bool>,
    pub verified: Option<bool>,
    pub signed: Option<bool>,
    pub meta_version: Option<String>,
}

/// Content (or a link to it) of a descriptor or test parameter file.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWrapper {
    #[serde(alias = "descriptor", alias = "test")]
    pub content: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub descriptor_type: Option<String>,
}

/// Classification of an entry in a version's file listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    TestFile,
    PrimaryDescriptor,
    SecondaryDescriptor,
    Containerfile,
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolFile {
    pub path: Option<String>,
    pub file_type: Option<FileType>,
}
