use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::RepoFetcher;
use crate::error::{Error, Result};
use crate::types::{RepoIdentity, RepoTree, TreeEntry};

/// Revision label for a directory read as-is
pub const WORKING_TREE: &str = "working tree";

/// A repository checked out on the local filesystem.
///
/// `.gitignore` rules are honored and `.git` is never entered.
pub struct LocalFetcher {
    concurrency: usize,
}

impl LocalFetcher {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }
}

fn root_of(repo: &RepoIdentity) -> Result<&Path> {
    match repo {
        RepoIdentity::Local(path) => Ok(path),
        RepoIdentity::GitHub { .. } => Err(Error::InvalidInput(format!(
            "{} is a GitHub repository, not a local directory",
            repo
        ))),
    }
}

/// Forward-slash path of `path` relative to `root`
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Join a repository path onto `root`, refusing anything that could leave it
fn resolve_inside(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut full = root.to_path_buf();
    for segment in rel.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        full.push(segment);
    }
    Some(full)
}

fn walk(root: &Path) -> Result<Vec<TreeEntry>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    let mut entries = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Walk error: {}", e);
                continue;
            }
        };
        let Some(path) = relative_path(root, entry.path()) else {
            continue;
        };
        match entry.file_type() {
            Some(ft) if ft.is_dir() => entries.push(TreeEntry::directory(path)),
            Some(ft) if ft.is_file() => {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                entries.push(TreeEntry::file(path, size));
            }
            _ => {}
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

#[async_trait]
impl RepoFetcher for LocalFetcher {
    async fn fetch_tree(&self, repo: &RepoIdentity) -> Result<RepoTree> {
        let root = root_of(repo)?.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || walk(&root))
            .await
            .map_err(|e| Error::Fetch(format!("directory walk aborted: {}", e)))??;

        Ok(RepoTree {
            revision: WORKING_TREE.to_string(),
            entries,
        })
    }

    async fn fetch_contents(
        &self,
        repo: &RepoIdentity,
        _revision: &str,
        paths: &[String],
        max_count: usize,
    ) -> Result<BTreeMap<String, String>> {
        let root = root_of(repo)?;

        let results: Vec<(String, Option<String>)> =
            stream::iter(paths.iter().take(max_count).cloned())
                .map(|rel: String| async move {
                    let Some(full) = resolve_inside(root, &rel) else {
                        debug!("Skipping {}: outside repository", rel);
                        return (rel, None);
                    };
                    let text = match tokio::fs::read(&full).await {
                        Ok(bytes) => match String::from_utf8(bytes) {
                            Ok(text) => Some(text),
                            Err(_) => {
                                debug!("Skipping {}: not UTF-8", rel);
                                None
                            }
                        },
                        Err(e) => {
                            debug!("Skipping {}: {}", rel, e);
                            None
                        }
                    };
                    (rel, text)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        Ok(results
            .into_iter()
            .filter_map(|(path, text)| text.map(|t| (path, t)))
            .collect())
    }
}
