//! File read/write DTOs.
//!
//! - `RemoteFile`: File fetched from the hosting API (decoded bytes)
//! - `FileChange`, `FileDeletion`: Write commands sent to the hosting API
//! - `CreateFileRequest`, `UpdateFileRequest`, `DeleteFileQuery`: Route inputs
//! - `FileContent`, `FileWriteResponse`: Route outputs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
    pub content: Vec<u8>,
}

/// Create (`sha: None`) or update (`sha: Some`) of a single file.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: String,
    pub message: String,
    pub content: Vec<u8>,
    pub branch: String,
    pub sha: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileDeletion {
    pub path: String,
    pub message: String,
    pub branch: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFileRequest {
    pub branch: Option<String>,
    #[serde(default)]
    pub path: String,
    pub name: Option<String>,
    #[serde(default)]
    pub content: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFileRequest {
    pub content: String,
    pub message: Option<String>,
    pub branch: Option<String>,
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteFileQuery {
    pub branch: Option<String>,
    pub message: Option<String>,
    pub sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub sha: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWriteResponse {
    pub message: String,
    pub path: String,
    pub commit: String,
}
