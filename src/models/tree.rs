//! Tree listing DTOs.
//!
//! - `TreeEntry`: One row of a flat recursive listing (boundary-mapped)
//! - `TreeListing`: A whole listing for one commit
//! - `ChildEntry`: One row of a single directory level (structure view)
//! - `StructureResponse`, `DumpResponse`: Response envelopes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule pointer.
    Commit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
    pub sha: String,
}

impl TreeEntry {
    pub fn new(path: impl Into<String>, kind: EntryKind, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            sha: sha.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TreeListing {
    pub sha: String,
    pub entries: Vec<TreeEntry>,
    /// The remote capped the recursive listing.
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChildEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureResponse {
    pub structure: Vec<ChildEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub binary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpResponse {
    pub branch: String,
    pub truncated: bool,
    pub entries: Vec<DumpEntry>,
}
