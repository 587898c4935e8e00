//! Directory listing endpoint.
//!
//! GET /repo/{repo}/structure?branch=&path=
//!
//! Resolves the branch (default branch when omitted) to its head commit,
//! fetches the recursive tree once and returns the direct children of `path`
//! (repository root when omitted).

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{branch_listing, branch_or_default, find_repository};
use crate::error::Result;
use crate::explorer;
use crate::hosting::SharedClient;
use crate::models::StructureResponse;

pub fn routes(client: SharedClient) -> Router {
    Router::new()
        .route("/repo/{repo}/structure", get(get_structure))
        .with_state(client)
}

#[derive(Debug, Deserialize)]
struct StructureQuery {
    branch: Option<String>,
    #[serde(default)]
    path: String,
}

async fn get_structure(
    State(client): State<SharedClient>,
    Path(repo): Path<String>,
    Query(query): Query<StructureQuery>,
) -> Result<Json<StructureResponse>> {
    let info = find_repository(client.as_ref(), &repo).await?;
    let branch = branch_or_default(query.branch, &info);
    let listing = branch_listing(client.as_ref(), &repo, &branch).await?;

    let base_path = query.path.trim_end_matches('/');
    let structure = explorer::children(&listing.entries, base_path);
    tracing::debug!(
        "{}@{} '{}': {} of {} entries",
        info.full_name,
        branch,
        base_path,
        structure.len(),
        listing.entries.len()
    );

    Ok(Json(StructureResponse { structure }))
}
