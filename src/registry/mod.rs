//! Consolidated role registry: types and helpers shared by the merge,
//! validation, and uniqueness stages.
//!
//! Role source files are read-only inputs; the consolidated index is the
//! single persisted artifact, rebuilt in full on every merge run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod dedup;
pub mod discover;
pub mod locate;
pub mod merge;
pub mod schema;

pub use dedup::{check_index, Finding, UniquenessChecker};
pub use discover::discover_role_files;
pub use locate::{resolve_location, Location};
pub use merge::{merge_category, merge_tree, write_index, MergeStats};
pub use schema::{validate_index, Violation};

/// Merged output written by the merge stage, consumed by validate/check.
/// Excluded from discovery so a re-run never merges its own output.
pub const INDEX_FILE: &str = "index.json";
/// Schema document consumed by the validate stage; also excluded from discovery.
pub const SCHEMA_FILE: &str = "schema.json";

pub const SSDP_CATEGORY: &str = "SSDP_IIQ_Roles";
pub const EDC_CATEGORY: &str = "EDC_IIQ_Roles";

/// Display-name field of a role record.
pub const ROLE_NAME_FIELD: &str = "IIQ_Role_Name";
/// Distinguished-name field the short identifier is derived from.
pub const ORG_UNIT_FIELD: &str = "AD_Organizational_Unit";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("unable to encode index: {0}")]
    Encode(serde_json::Error),
    #[error("schema did not compile: {0}")]
    SchemaCompile(String),
    #[error("required input '{0}' not found")]
    MissingInput(PathBuf),
}

/// Pre-condition check for an input artifact that must already exist.
pub fn require_input(path: &Path) -> Result<(), RegistryError> {
    if path.exists() {
        Ok(())
    } else {
        Err(RegistryError::MissingInput(path.to_path_buf()))
    }
}

/// One merged domain: every source file sharing an `id` within a category
/// contributes to exactly one of these, roles concatenated in discovery order.
/// Fields default on deserialize so a hand-edited index still loads; the
/// validate and check stages report holes instead of refusing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "Roles", default)]
    pub roles: Vec<Value>,
}

/// The consolidated index: fixed category buckets, each an ordered sequence
/// of domain records. Field order here is the persisted key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleIndex {
    #[serde(rename = "SSDP_IIQ_Roles", default)]
    pub ssdp: Vec<Domain>,
    #[serde(rename = "EDC_IIQ_Roles", default)]
    pub edc: Vec<Domain>,
}

/// Display name of an opaque role record, if present and a string.
pub fn role_name(role: &Value) -> Option<&str> {
    role.get(ROLE_NAME_FIELD).and_then(Value::as_str)
}

/// Raw organizational-unit value of a role record.
pub fn org_unit(role: &Value) -> Option<&Value> {
    role.get(ORG_UNIT_FIELD)
}

/// Read and parse a JSON document.
pub fn load_json(path: &Path) -> Result<Value, RegistryError> {
    let raw = fs::read_to_string(path).map_err(|err| RegistryError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    serde_json::from_str(&raw).map_err(|err| RegistryError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

/// Load the consolidated index produced by the merge stage.
pub fn load_index(path: &Path) -> Result<RoleIndex, RegistryError> {
    let raw = fs::read_to_string(path).map_err(|err| RegistryError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    serde_json::from_str(&raw).map_err(|err| RegistryError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}
