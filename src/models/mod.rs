//! Data transfer objects (DTOs) for requests and responses.
//!
//! - `tree`: TreeEntry, EntryKind, TreeListing, ChildEntry, structure and dump envelopes
//! - `file`: RemoteFile, FileChange, FileDeletion and the file route bodies
//! - `repository`: RepositoryInfo, CommitRef

pub mod file;
pub mod repository;
pub mod tree;

pub use file::*;
pub use repository::*;
pub use tree::*;
