//! Whole-repository dump endpoint.
//!
//! GET /repo/{repo}/dump?branch=
//!
//! Returns every entry of the branch's recursive listing in listing order,
//! with each blob's body inlined when it is valid UTF-8 and flagged as
//! `binary` otherwise. Blobs are fetched one at a time.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{branch_listing, branch_or_default, find_repository};
use crate::error::{AppError, Result};
use crate::hosting::SharedClient;
use crate::models::{DumpEntry, DumpResponse, EntryKind};

pub fn routes(client: SharedClient) -> Router {
    Router::new()
        .route("/repo/{repo}/dump", get(dump_repository))
        .with_state(client)
}

#[derive(Debug, Deserialize)]
struct DumpQuery {
    branch: Option<String>,
}

async fn dump_repository(
    State(client): State<SharedClient>,
    Path(repo): Path<String>,
    Query(query): Query<DumpQuery>,
) -> Result<Json<DumpResponse>> {
    let info = find_repository(client.as_ref(), &repo).await?;
    let branch = branch_or_default(query.branch, &info);
    let listing = branch_listing(client.as_ref(), &repo, &branch).await?;

    let mut entries = Vec::with_capacity(listing.entries.len());
    for entry in listing.entries {
        let mut dumped = DumpEntry {
            path: entry.path,
            kind: entry.kind,
            content: None,
            binary: false,
        };

        if entry.kind == EntryKind::Blob {
            let bytes = client.blob(&repo, &entry.sha).await.map_err(|e| {
                AppError::from_hosting(e, || {
                    AppError::FileNotFound(dumped.path.clone())
                })
            })?;
            match String::from_utf8(bytes) {
                Ok(text) => dumped.content = Some(text),
                Err(_) => dumped.binary = true,
            }
        }

        entries.push(dumped);
    }
    tracing::debug!("Dumped {} entries of {}@{}", entries.len(), info.full_name, branch);

    Ok(Json(DumpResponse {
        branch,
        truncated: listing.truncated,
        entries,
    }))
}
