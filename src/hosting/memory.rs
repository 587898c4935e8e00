//! In-memory `HostingClient` for route tests.
//!
//! Repositories are maps of branch -> (path -> bytes). Directory entries are
//! derived from file paths, and blob shas are derived from path and content,
//! so a stale sha is detected the same way the remote does it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{HostingClient, HostingError, HostingResult};
use crate::models::{
    CommitRef, EntryKind, FileChange, FileDeletion, RemoteFile, RepositoryInfo, TreeEntry,
    TreeListing,
};

type Files = BTreeMap<String, Vec<u8>>;

struct MemoryRepo {
    default_branch: String,
    branches: HashMap<String, Files>,
    commits: usize,
}

#[derive(Default)]
pub struct MemoryHost {
    repos: Mutex<HashMap<String, MemoryRepo>>,
}

pub fn blob_sha(path: &str, content: &[u8]) -> String {
    let checksum = content
        .iter()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(*b)));
    format!("{}-{:x}-{}", path.replace('/', ":"), checksum, content.len())
}

fn not_found() -> HostingError {
    HostingError::NotFound("Not Found".to_string())
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(self, name: &str, default_branch: &str, files: &[(&str, &[u8])]) -> Self {
        let files: Files = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.to_vec()))
            .collect();
        let repo = MemoryRepo {
            default_branch: default_branch.to_string(),
            branches: HashMap::from([(default_branch.to_string(), files)]),
            commits: 0,
        };
        self.repos.lock().unwrap().insert(name.to_string(), repo);
        self
    }

    pub fn with_branch(self, repo: &str, branch: &str, files: &[(&str, &[u8])]) -> Self {
        let files: Files = files
            .iter()
            .map(|(path, content)| (path.to_string(), content.to_vec()))
            .collect();
        self.repos
            .lock()
            .unwrap()
            .get_mut(repo)
            .expect("repository must exist")
            .branches
            .insert(branch.to_string(), files);
        self
    }

    pub fn file_bytes(&self, repo: &str, branch: &str, path: &str) -> Option<Vec<u8>> {
        let repos = self.repos.lock().unwrap();
        repos.get(repo)?.branches.get(branch)?.get(path).cloned()
    }

    fn with_files<T>(
        &self,
        repo: &str,
        branch: &str,
        f: impl FnOnce(&mut Files, &mut usize) -> HostingResult<T>,
    ) -> HostingResult<T> {
        let mut repos = self.repos.lock().unwrap();
        let repo = repos.get_mut(repo).ok_or_else(not_found)?;
        let files = repo.branches.get_mut(branch).ok_or_else(not_found)?;
        f(files, &mut repo.commits)
    }
}

fn listing(files: &Files) -> Vec<TreeEntry> {
    let mut directories = BTreeSet::new();
    for path in files.keys() {
        let mut current = path.as_str();
        while let Some((parent, _)) = current.rsplit_once('/') {
            directories.insert(parent.to_string());
            current = parent;
        }
    }

    let mut entries: Vec<TreeEntry> = directories
        .into_iter()
        .map(|dir| TreeEntry::new(dir.clone(), EntryKind::Tree, format!("tree-{}", dir)))
        .chain(
            files
                .iter()
                .map(|(path, content)| TreeEntry::new(path.clone(), EntryKind::Blob, blob_sha(path, content))),
        )
        .collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

fn next_commit(commits: &mut usize) -> CommitRef {
    *commits += 1;
    CommitRef {
        sha: format!("commit-{}", commits),
    }
}

#[async_trait]
impl HostingClient for MemoryHost {
    async fn repository(&self, repo: &str) -> HostingResult<RepositoryInfo> {
        let repos = self.repos.lock().unwrap();
        let found = repos.get(repo).ok_or_else(not_found)?;
        Ok(RepositoryInfo {
            full_name: format!("tester/{}", repo),
            default_branch: found.default_branch.clone(),
        })
    }

    async fn branch_head(&self, repo: &str, branch: &str) -> HostingResult<String> {
        let repos = self.repos.lock().unwrap();
        let found = repos.get(repo).ok_or_else(not_found)?;
        if found.branches.contains_key(branch) {
            // Branch names double as commit shas here.
            Ok(branch.to_string())
        } else {
            Err(not_found())
        }
    }

    async fn tree(&self, repo: &str, sha: &str) -> HostingResult<TreeListing> {
        self.with_files(repo, sha, |files, _| {
            Ok(TreeListing {
                sha: sha.to_string(),
                entries: listing(files),
                truncated: false,
            })
        })
    }

    async fn file(&self, repo: &str, path: &str, reference: &str) -> HostingResult<RemoteFile> {
        self.with_files(repo, reference, |files, _| {
            if let Some(content) = files.get(path) {
                return Ok(RemoteFile {
                    path: path.to_string(),
                    sha: blob_sha(path, content),
                    content: content.clone(),
                });
            }
            let prefix = format!("{}/", path);
            if files.keys().any(|p| p.starts_with(&prefix)) {
                Err(HostingError::NotAFile(path.to_string()))
            } else {
                Err(not_found())
            }
        })
    }

    async fn blob(&self, repo: &str, sha: &str) -> HostingResult<Vec<u8>> {
        let repos = self.repos.lock().unwrap();
        let found = repos.get(repo).ok_or_else(not_found)?;
        found
            .branches
            .values()
            .flat_map(|files| files.iter())
            .find(|(path, content)| blob_sha(path, content) == sha)
            .map(|(_, content)| content.clone())
            .ok_or_else(not_found)
    }

    async fn create_file(&self, repo: &str, change: &FileChange) -> HostingResult<CommitRef> {
        self.with_files(repo, &change.branch, |files, commits| {
            if files.contains_key(&change.path) {
                return Err(HostingError::Api {
                    status: 422,
                    message: "Invalid request.\n\n\"sha\" wasn't supplied.".to_string(),
                });
            }
            files.insert(change.path.clone(), change.content.clone());
            Ok(next_commit(commits))
        })
    }

    async fn update_file(&self, repo: &str, change: &FileChange) -> HostingResult<CommitRef> {
        self.with_files(repo, &change.branch, |files, commits| {
            let current = files.get(&change.path).ok_or_else(not_found)?;
            if change.sha.as_deref() != Some(blob_sha(&change.path, current).as_str()) {
                return Err(HostingError::Api {
                    status: 409,
                    message: format!("{} does not match {}", change.path, change.sha.as_deref().unwrap_or("")),
                });
            }
            files.insert(change.path.clone(), change.content.clone());
            Ok(next_commit(commits))
        })
    }

    async fn delete_file(&self, repo: &str, deletion: &FileDeletion) -> HostingResult<CommitRef> {
        self.with_files(repo, &deletion.branch, |files, commits| {
            let current = files.get(&deletion.path).ok_or_else(not_found)?;
            if blob_sha(&deletion.path, current) != deletion.sha {
                return Err(HostingError::Api {
                    status: 409,
                    message: format!("{} does not match {}", deletion.path, deletion.sha),
                });
            }
            files.remove(&deletion.path);
            Ok(next_commit(commits))
        })
    }

    async fn authenticated_user(&self) -> HostingResult<String> {
        Ok("tester".to_string())
    }

    async fn repositories(&self, limit: u8) -> HostingResult<Vec<String>> {
        let repos = self.repos.lock().unwrap();
        let mut names: Vec<String> = repos.keys().cloned().collect();
        names.sort();
        names.truncate(usize::from(limit));
        Ok(names)
    }
}
