//! API route handlers - maps HTTP endpoints to hosting API calls.
//!
//! Each submodule defines routes for a feature area:
//! - `structure`: One directory level of a branch (GET /repo/{repo}/structure)
//! - `file`: Read, create, update and delete single files
//! - `dump`: Whole tree with file bodies inlined (GET /repo/{repo}/dump)

pub mod dump;
pub mod file;
pub mod structure;

use axum::Router;

use crate::error::{AppError, Result};
use crate::hosting::{HostingClient, SharedClient};
use crate::models::{RepositoryInfo, TreeListing};

pub fn create_router(client: SharedClient) -> Router {
    Router::new()
        .merge(structure::routes(client.clone()))
        .merge(file::routes(client.clone()))
        .merge(dump::routes(client))
}

async fn find_repository(client: &dyn HostingClient, repo: &str) -> Result<RepositoryInfo> {
    client
        .repository(repo)
        .await
        .map_err(|e| AppError::from_hosting(e, || AppError::RepoNotFound(repo.to_string())))
}

/// Picks the requested branch, or the repository default when none is given.
fn branch_or_default(branch: Option<String>, info: &RepositoryInfo) -> String {
    branch
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| info.default_branch.clone())
}

/// Resolves `branch` to its head commit and fetches the recursive listing.
async fn branch_listing(client: &dyn HostingClient, repo: &str, branch: &str) -> Result<TreeListing> {
    let missing = || AppError::BranchNotFound(branch.to_string());

    let sha = client
        .branch_head(repo, branch)
        .await
        .map_err(|e| AppError::from_hosting(e, missing))?;
    let listing = client
        .tree(repo, &sha)
        .await
        .map_err(|e| AppError::from_hosting(e, missing))?;

    tracing::debug!("{}@{} -> tree {}", repo, branch, listing.sha);
    if listing.truncated {
        tracing::warn!(
            "Tree listing for {}@{} was truncated by the hosting API ({} entries)",
            repo,
            branch,
            listing.entries.len()
        );
    }
    Ok(listing)
}
