//! Single-file endpoints.
//!
//! - GET /repo/{repo}/file/{*path}?branch=
//!   Returns the decoded UTF-8 content and blob sha of one file.
//!
//! - POST /repo/{repo}/file { name, path?, content?, message?, branch? }
//!   Creates `path/name`. The body is parsed as JSON whatever the content type.
//!
//! - PUT /repo/{repo}/file/{*path} { content, message?, branch?, sha? }
//!   Replaces a file. Without `sha` the current blob sha is looked up first.
//!
//! - DELETE /repo/{repo}/file/{*path}?branch=&message=&sha=
//!   Deletes a file, resolving the sha the same way as PUT.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{branch_or_default, find_repository};
use crate::error::{AppError, Result};
use crate::hosting::{HostingClient, SharedClient};
use crate::models::{
    CreateFileRequest, DeleteFileQuery, FileChange, FileContent, FileDeletion,
    FileWriteResponse, UpdateFileRequest,
};

const DEFAULT_CREATE_MESSAGE: &str = "Create new file via API";
const DEFAULT_UPDATE_MESSAGE: &str = "Update file via API";
const DEFAULT_DELETE_MESSAGE: &str = "Delete file via API";

pub fn routes(client: SharedClient) -> Router {
    Router::new()
        .route("/repo/{repo}/file", post(create_file))
        .route(
            "/repo/{repo}/file/{*path}",
            get(get_file).put(update_file).delete(delete_file),
        )
        .with_state(client)
}

#[derive(Debug, Deserialize)]
struct BranchQuery {
    branch: Option<String>,
}

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", String::from_utf8_lossy(body));
        AppError::BadRequest(format!("Invalid JSON: {}", e))
    })
}

/// Joins a directory and a file name, ignoring trailing slashes on the directory.
fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

async fn current_sha(
    client: &dyn HostingClient,
    repo: &str,
    path: &str,
    branch: &str,
) -> Result<String> {
    let file = client
        .file(repo, path, branch)
        .await
        .map_err(|e| AppError::from_hosting(e, || AppError::FileNotFound(path.to_string())))?;
    Ok(file.sha)
}

async fn get_file(
    State(client): State<SharedClient>,
    Path((repo, path)): Path<(String, String)>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<FileContent>> {
    let info = find_repository(client.as_ref(), &repo).await?;
    let reference = branch_or_default(query.branch, &info);

    let file = client
        .file(&repo, &path, &reference)
        .await
        .map_err(|e| AppError::from_hosting(e, || AppError::FileNotFound(path.clone())))?;
    let content = String::from_utf8(file.content)
        .map_err(|_| AppError::Internal(format!("File '{}' is not valid UTF-8", path)))?;

    Ok(Json(FileContent {
        path,
        sha: file.sha,
        content,
    }))
}

async fn create_file(
    State(client): State<SharedClient>,
    Path(repo): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<FileWriteResponse>)> {
    let request: CreateFileRequest = parse_json(&body)?;
    let info = find_repository(client.as_ref(), &repo).await?;

    let name = request
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Field \"name\" is required".to_string()))?;
    let full_path = join_path(&request.path, &name);

    let change = FileChange {
        path: full_path,
        message: request
            .message
            .unwrap_or_else(|| DEFAULT_CREATE_MESSAGE.to_string()),
        content: request.content.into_bytes(),
        branch: branch_or_default(request.branch, &info),
        sha: None,
    };
    let commit = client.create_file(&repo, &change).await.map_err(|e| {
        AppError::from_hosting(e, || {
            AppError::NotFound("Could not create file: path or branch not found".to_string())
        })
    })?;
    tracing::info!("Created {}:{} on {} ({})", repo, change.path, change.branch, commit.sha);

    Ok((
        StatusCode::CREATED,
        Json(FileWriteResponse {
            message: "File created".to_string(),
            path: change.path,
            commit: commit.sha,
        }),
    ))
}

async fn update_file(
    State(client): State<SharedClient>,
    Path((repo, path)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<FileWriteResponse>> {
    let request: UpdateFileRequest = parse_json(&body)?;
    let info = find_repository(client.as_ref(), &repo).await?;
    let branch = branch_or_default(request.branch, &info);

    let sha = match request.sha {
        Some(sha) => sha,
        None => current_sha(client.as_ref(), &repo, &path, &branch).await?,
    };

    let change = FileChange {
        path,
        message: request
            .message
            .unwrap_or_else(|| DEFAULT_UPDATE_MESSAGE.to_string()),
        content: request.content.into_bytes(),
        branch,
        sha: Some(sha),
    };
    let commit = client
        .update_file(&repo, &change)
        .await
        .map_err(|e| AppError::from_hosting(e, || AppError::FileNotFound(change.path.clone())))?;
    tracing::info!("Updated {}:{} on {} ({})", repo, change.path, change.branch, commit.sha);

    Ok(Json(FileWriteResponse {
        message: "File updated".to_string(),
        path: change.path,
        commit: commit.sha,
    }))
}

async fn delete_file(
    State(client): State<SharedClient>,
    Path((repo, path)): Path<(String, String)>,
    Query(query): Query<DeleteFileQuery>,
) -> Result<Json<FileWriteResponse>> {
    let info = find_repository(client.as_ref(), &repo).await?;
    let branch = branch_or_default(query.branch, &info);

    let sha = match query.sha {
        Some(sha) => sha,
        None => current_sha(client.as_ref(), &repo, &path, &branch).await?,
    };

    let deletion = FileDeletion {
        path,
        message: query
            .message
            .unwrap_or_else(|| DEFAULT_DELETE_MESSAGE.to_string()),
        branch,
        sha,
    };
    let commit = client
        .delete_file(&repo, &deletion)
        .await
        .map_err(|e| AppError::from_hosting(e, || AppError::FileNotFound(deletion.path.clone())))?;
    tracing::info!("Deleted {}:{} on {} ({})", repo, deletion.path, deletion.branch, commit.sha);

    Ok(Json(FileWriteResponse {
        message: "File deleted".to_string(),
        path: deletion.path,
        commit: commit.sha,
    }))
}
