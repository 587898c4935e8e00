//! GitHub REST v3 client.
//!
//! One `reqwest::Client` is built at startup and reused for every request.
//! Wire structs stay private to this module; callers only see models.
//!
//! Endpoints used:
//! - GET    /repos/{owner}/{repo}
//! - GET    /repos/{owner}/{repo}/git/ref/heads/{branch}
//! - GET    /repos/{owner}/{repo}/git/trees/{sha}?recursive=1
//! - GET    /repos/{owner}/{repo}/git/blobs/{sha}
//! - GET    /repos/{owner}/{repo}/contents/{path}?ref=
//! - PUT    /repos/{owner}/{repo}/contents/{path}
//! - DELETE /repos/{owner}/{repo}/contents/{path}
//! - GET    /user, /user/repos

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, Method, RequestBuilder, Response, Url, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{HostingClient, HostingError, HostingResult};
use crate::models::{
    CommitRef, EntryKind, FileChange, FileDeletion, RemoteFile, RepositoryInfo, TreeEntry,
    TreeListing,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("repo-gateway/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    http: Client,
    base: Url,
    token: String,
    owner: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: impl Into<String>, owner: impl Into<String>) -> HostingResult<Self> {
        let base = Url::parse(api_url)
            .map_err(|e| HostingError::Decode(format!("invalid API URL '{}': {}", api_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(HostingError::Decode(format!("invalid API URL '{}'", api_url)));
        }
        let http = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base,
            token: token.into(),
            owner: owner.into(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    /// `/repos/{owner}/{repo}/...` with every extra segment percent-encoded.
    fn repo_url<'a>(&'a self, repo: &'a str, rest: impl IntoIterator<Item = &'a str>) -> Url {
        self.url(["repos", self.owner.as_str(), repo].into_iter().chain(rest))
    }

    fn contents_url(&self, repo: &str, path: &str) -> Url {
        self.repo_url(repo, ["contents"].into_iter().chain(split_path(path)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> HostingResult<T> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Turns a non-success response into the matching `HostingError`.
async fn check_status(response: Response) -> HostingResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    tracing::warn!("GitHub {} for {}: {}", status.as_u16(), url.path(), message);

    if status == reqwest::StatusCode::NOT_FOUND {
        Err(HostingError::NotFound(message))
    } else {
        Err(HostingError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Decodes GitHub's newline-wrapped base64.
fn decode_content(encoded: &str) -> HostingResult<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| HostingError::Decode(format!("invalid base64 content: {}", e)))
}

fn entry_kind(raw: &str) -> Option<EntryKind> {
    match raw {
        "blob" => Some(EntryKind::Blob),
        "tree" => Some(EntryKind::Tree),
        "commit" => Some(EntryKind::Commit),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    sha: String,
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

impl TreeResponse {
    fn into_listing(self) -> TreeListing {
        let entries = self
            .tree
            .into_iter()
            .filter_map(|item| match entry_kind(&item.kind) {
                Some(kind) => Some(TreeEntry::new(item.path, kind, item.sha)),
                None => {
                    tracing::debug!("Skipping tree item {} of type {}", item.path, item.kind);
                    None
                }
            })
            .collect();

        TreeListing {
            sha: self.sha,
            entries,
            truncated: self.truncated,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    #[serde(default)]
    encoding: String,
}

/// `contents` answers with an object for files and an array for directories.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    File(ContentsFile),
    Directory(Vec<serde::de::IgnoredAny>),
}

#[derive(Debug, Deserialize)]
struct ContentsFile {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    sha: String,
    /// `none` when the file is too large to inline (over 1 MB).
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteContentsBody<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    commit: GitObject,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoSummary {
    name: String,
}

impl GitHubClient {
    async fn put_contents(&self, repo: &str, change: &FileChange) -> HostingResult<CommitRef> {
        let body = PutContentsBody {
            message: &change.message,
            content: BASE64.encode(&change.content),
            branch: &change.branch,
            sha: change.sha.as_deref(),
        };
        let request = self
            .request(Method::PUT, self.contents_url(repo, &change.path))
            .json(&body);
        let response: CommitResponse = self.send(request).await?;
        Ok(CommitRef {
            sha: response.commit.sha,
        })
    }
}

#[async_trait]
impl HostingClient for GitHubClient {
    async fn repository(&self, repo: &str) -> HostingResult<RepositoryInfo> {
        let request = self.request(Method::GET, self.repo_url(repo, []));
        let response: RepoResponse = self.send(request).await?;
        Ok(RepositoryInfo {
            full_name: response.full_name,
            default_branch: response.default_branch,
        })
    }

    async fn branch_head(&self, repo: &str, branch: &str) -> HostingResult<String> {
        let url = self.repo_url(repo, ["git", "ref", "heads"].into_iter().chain(split_path(branch)));
        let response: RefResponse = self.send(self.request(Method::GET, url)).await?;
        Ok(response.object.sha)
    }

    async fn tree(&self, repo: &str, sha: &str) -> HostingResult<TreeListing> {
        let request = self
            .request(Method::GET, self.repo_url(repo, ["git", "trees", sha]))
            .query(&[("recursive", "1")]);
        let response: TreeResponse = self.send(request).await?;
        Ok(response.into_listing())
    }

    async fn file(&self, repo: &str, path: &str, reference: &str) -> HostingResult<RemoteFile> {
        let request = self
            .request(Method::GET, self.contents_url(repo, path))
            .query(&[("ref", reference)]);

        match self.send::<ContentsResponse>(request).await? {
            ContentsResponse::Directory(entries) => {
                tracing::debug!("{} is a directory with {} entries", path, entries.len());
                Err(HostingError::NotAFile(path.to_string()))
            }
            ContentsResponse::File(file) if file.kind != "file" => {
                tracing::debug!("{} has content type {}", path, file.kind);
                Err(HostingError::NotAFile(path.to_string()))
            }
            ContentsResponse::File(file) => {
                let content = match (file.encoding.as_deref(), file.content.as_deref()) {
                    (Some("base64"), Some(encoded)) => decode_content(encoded)?,
                    (Some("none") | None, _) | (_, None) => {
                        tracing::debug!("{} is not inlined, fetching blob {}", path, file.sha);
                        self.blob(repo, &file.sha).await?
                    }
                    (Some(other), Some(_)) => {
                        return Err(HostingError::Decode(format!(
                            "unsupported content encoding {} for {}",
                            other, path
                        )));
                    }
                };
                Ok(RemoteFile {
                    path: file.path,
                    sha: file.sha,
                    content,
                })
            }
        }
    }

    async fn blob(&self, repo: &str, sha: &str) -> HostingResult<Vec<u8>> {
        let request = self.request(Method::GET, self.repo_url(repo, ["git", "blobs", sha]));
        let response: BlobResponse = self.send(request).await?;
        match response.encoding.as_str() {
            "base64" => decode_content(&response.content),
            "utf-8" | "" => Ok(response.content.into_bytes()),
            other => Err(HostingError::Decode(format!("unsupported blob encoding {}", other))),
        }
    }

    async fn create_file(&self, repo: &str, change: &FileChange) -> HostingResult<CommitRef> {
        self.put_contents(repo, change).await
    }

    async fn update_file(&self, repo: &str, change: &FileChange) -> HostingResult<CommitRef> {
        if change.sha.is_none() {
            return Err(HostingError::Decode(format!(
                "update of {} requires the current blob sha",
                change.path
            )));
        }
        self.put_contents(repo, change).await
    }

    async fn delete_file(&self, repo: &str, deletion: &FileDeletion) -> HostingResult<CommitRef> {
        let body = DeleteContentsBody {
            message: &deletion.message,
            sha: &deletion.sha,
            branch: &deletion.branch,
        };
        let request = self
            .request(Method::DELETE, self.contents_url(repo, &deletion.path))
            .json(&body);
        let response: CommitResponse = self.send(request).await?;
        Ok(CommitRef {
            sha: response.commit.sha,
        })
    }

    async fn authenticated_user(&self) -> HostingResult<String> {
        let response: UserResponse = self.send(self.request(Method::GET, self.url(["user"]))).await?;
        Ok(response.login)
    }

    async fn repositories(&self, limit: u8) -> HostingResult<Vec<String>> {
        let request = self
            .request(Method::GET, self.url(["user", "repos"]))
            .query(&[("per_page", limit.to_string())]);
        let response: Vec<RepoSummary> = self.send(request).await?;
        Ok(response.into_iter().map(|r| r.name).collect())
    }
}
