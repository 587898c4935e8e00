use serde::Serialize;

/// Repository metadata needed to resolve default refs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub full_name: String,
    pub default_branch: String,
}

/// Commit produced by a write on the hosting side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    pub sha: String,
}
