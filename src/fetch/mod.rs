mod github;
mod local;

pub use github::GitHubFetcher;
pub use local::LocalFetcher;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::GitHubConfig;
use crate::error::Result;
use crate::types::{RepoIdentity, RepoTree};

/// Source of repository trees and file contents.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    /// Full listing at the repository's current revision.
    async fn fetch_tree(&self, repo: &RepoIdentity) -> Result<RepoTree>;

    /// Text of up to `max_count` of `paths`, taken in the given order.
    ///
    /// Files that fail individually are left out of the map; only a failure
    /// of the repository as a whole is an error.
    async fn fetch_contents(
        &self,
        repo: &RepoIdentity,
        revision: &str,
        paths: &[String],
        max_count: usize,
    ) -> Result<BTreeMap<String, String>>;
}

/// Fetcher for the kind of repository `repo` names.
pub fn create_fetcher(repo: &RepoIdentity, config: &GitHubConfig) -> Result<Arc<dyn RepoFetcher>> {
    match repo {
        RepoIdentity::GitHub { .. } => Ok(Arc::new(GitHubFetcher::new(config)?)),
        RepoIdentity::Local(_) => Ok(Arc::new(LocalFetcher::new(config.concurrency))),
    }
}
