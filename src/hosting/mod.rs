//! Remote source-control hosting boundary.
//!
//! `HostingClient` is the seam between route handlers and the remote API.
//! Implementations map remote payloads into plain models and remote
//! failures into `HostingError`, so nothing above this module depends on
//! the wire format.
//!
//! - `github`: GitHub REST v3 implementation over reqwest
//! - `memory`: In-memory implementation used by route tests

pub mod github;
#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CommitRef, FileChange, FileDeletion, RemoteFile, RepositoryInfo, TreeListing,
};

pub use github::GitHubClient;

#[derive(Error, Debug)]
pub enum HostingError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0} is not a file")]
    NotAFile(String),

    #[error("Unexpected payload: {0}")]
    Decode(String),
}

pub type HostingResult<T> = std::result::Result<T, HostingError>;

/// Operations the gateway needs from the hosting service.
///
/// Every repository argument is a bare repository name; the owner is fixed
/// when the client is constructed.
#[async_trait]
pub trait HostingClient: Send + Sync {
    async fn repository(&self, repo: &str) -> HostingResult<RepositoryInfo>;

    /// Resolves `heads/<branch>` to the commit sha it points at.
    async fn branch_head(&self, repo: &str, branch: &str) -> HostingResult<String>;

    /// Full recursive listing of the tree reachable from `sha`.
    async fn tree(&self, repo: &str, sha: &str) -> HostingResult<TreeListing>;

    async fn file(&self, repo: &str, path: &str, reference: &str) -> HostingResult<RemoteFile>;

    async fn blob(&self, repo: &str, sha: &str) -> HostingResult<Vec<u8>>;

    async fn create_file(&self, repo: &str, change: &FileChange) -> HostingResult<CommitRef>;

    async fn update_file(&self, repo: &str, change: &FileChange) -> HostingResult<CommitRef>;

    async fn delete_file(&self, repo: &str, deletion: &FileDeletion) -> HostingResult<CommitRef>;

    /// Login of the account the credential belongs to.
    async fn authenticated_user(&self) -> HostingResult<String>;

    async fn repositories(&self, limit: u8) -> HostingResult<Vec<String>>;
}

pub type SharedClient = Arc<dyn HostingClient>;
