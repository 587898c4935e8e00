//! Gateway errors and their HTTP rendering.
//!
//! Handlers return `AppError`; hosting failures arrive as `HostingError` and
//! are mapped here, either generically (`From`) or with a route-specific
//! not-found kind (`AppError::from_hosting`). Every error renders as
//! `{"error": "<message>"}`.
//!
//! Status codes:
//! - `RepoNotFound`, `BranchNotFound`, `FileNotFound`, `NotFound` → 404
//! - `BadRequest`, `InvalidPath` → 400
//! - `Upstream` → the status the hosting API reported
//! - `Hosting`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::hosting::HostingError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository '{0}' not found")]
    RepoNotFound(String),

    #[error("Branch '{0}' not found")]
    BranchNotFound(String),

    #[error("File '{0}' not found")]
    FileNotFound(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("GitHub API error: {message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Hosting(HostingError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Maps a hosting failure, using `on_missing` for the 404 case.
    pub fn from_hosting(err: HostingError, on_missing: impl FnOnce() -> AppError) -> Self {
        match err {
            HostingError::NotFound(_) => on_missing(),
            other => other.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RepoNotFound(_)
            | AppError::BranchNotFound(_)
            | AppError::FileNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Hosting(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<HostingError> for AppError {
    fn from(err: HostingError) -> Self {
        match err {
            HostingError::NotFound(message) => AppError::NotFound(message),
            HostingError::Api { status, message } => AppError::Upstream { status, message },
            HostingError::NotAFile(path) => AppError::InvalidPath(format!("{} is not a file", path)),
            HostingError::Decode(message) => AppError::Internal(message),
            other => AppError::Hosting(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
