use async_trait::async_trait;
use chrono::DateTime;
use futures::stream::{self, StreamExt};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

use super::RepoFetcher;
use crate::config::GitHubConfig;
use crate::error::{Error, Result};
use crate::types::{RepoIdentity, RepoTree, TreeEntry};

const USER_AGENT: &str = concat!("repo-digest/", env!("CARGO_PKG_VERSION"));

/// Public repositories through the GitHub REST API; file bodies come from
/// the raw content host.
pub struct GitHubFetcher {
    api_url: String,
    raw_url: String,
    token: Option<String>,
    concurrency: usize,
    client: Client,
}

#[derive(Deserialize)]
struct RepoResponse {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    size: u64,
}

impl GitHubFetcher {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Fetch(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            raw_url: config.raw_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            concurrency: config.concurrency.max(1),
            client,
        })
    }

    async fn api_get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.api_url, endpoint);
        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| transport_error(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response.headers(), &url));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Fetch(format!("unexpected response from {}: {}", url, e)))
    }

    async fn fetch_raw(&self, owner: &str, repo: &str, revision: &str, path: &str) -> Result<String> {
        let url = raw_content_url(&self.raw_url, owner, repo, revision, path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url.as_str(), e))?;

        if !response.status().is_success() {
            return Err(Error::Fetch(format!(
                "{} returned HTTP {}",
                url,
                response.status().as_u16()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("cannot read {}: {}", path, e)))
    }
}

fn owner_repo(repo: &RepoIdentity) -> Result<(&str, &str)> {
    match repo {
        RepoIdentity::GitHub { owner, repo } => Ok((owner, repo)),
        RepoIdentity::Local(path) => Err(Error::InvalidInput(format!(
            "{} is a local directory, not a GitHub repository",
            path.display()
        ))),
    }
}

#[async_trait]
impl RepoFetcher for GitHubFetcher {
    async fn fetch_tree(&self, repo: &RepoIdentity) -> Result<RepoTree> {
        let (owner, name) = owner_repo(repo)?;

        let meta: RepoResponse = self.api_get(&format!("/repos/{}/{}", owner, name)).await?;
        let branch = meta.default_branch.unwrap_or_else(|| "main".to_string());

        let listing: TreeResponse = self
            .api_get(&format!(
                "/repos/{}/{}/git/trees/{}?recursive=1",
                owner, name, branch
            ))
            .await?;
        if listing.truncated {
            info!("Tree listing for {} was truncated by the host", repo);
        }

        let entries: Vec<TreeEntry> = listing
            .tree
            .into_iter()
            .filter_map(|item| match item.kind.as_str() {
                "blob" => Some(TreeEntry::file(item.path, item.size)),
                "tree" => Some(TreeEntry::directory(item.path)),
                // submodules
                _ => None,
            })
            .collect();

        debug!("{}: {} tree entries at {}", repo, entries.len(), branch);
        Ok(RepoTree {
            revision: branch,
            entries,
        })
    }

    async fn fetch_contents(
        &self,
        repo: &RepoIdentity,
        revision: &str,
        paths: &[String],
        max_count: usize,
    ) -> Result<BTreeMap<String, String>> {
        let (owner, name) = owner_repo(repo)?;

        let results: Vec<(String, Result<String>)> =
            stream::iter(paths.iter().take(max_count).cloned())
                .map(|path: String| async move {
                    let content = self.fetch_raw(owner, name, revision, &path).await;
                    (path, content)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut contents = BTreeMap::new();
        for (path, result) in results {
            match result {
                Ok(text) => {
                    contents.insert(path, text);
                }
                Err(e) => debug!("Skipping {}: {}", path, e),
            }
        }
        Ok(contents)
    }
}

fn raw_content_url(base: &str, owner: &str, repo: &str, revision: &str, path: &str) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| Error::InvalidInput(format!("invalid raw content URL '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidInput(format!("raw content URL '{}' cannot hold a path", base)))?
        .pop_if_empty()
        .extend([owner, repo, revision])
        .extend(path.split('/'));
    Ok(url)
}

fn transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Fetch(format!("request to {} timed out", url))
    } else {
        Error::Fetch(format!("network error fetching {}: {}", url, err))
    }
}

/// Map a failed API status to the error a caller can act on.
fn status_error(status: StatusCode, headers: &HeaderMap, url: &str) -> Error {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    match status.as_u16() {
        404 => Error::NotFound(
            "make sure the URL points to an existing public repository".to_string(),
        ),
        403 if header("x-ratelimit-remaining") == Some("0") => {
            let reset = header("x-ratelimit-reset")
                .and_then(|raw| raw.parse::<i64>().ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Error::RateLimited(format!(
                "GitHub API limit exhausted, resets at {}; set GITHUB_TOKEN to raise the limit",
                reset
            ))
        }
        403 => Error::PrivateRepository("access denied; the repository may be private".to_string()),
        429 => Error::RateLimited("GitHub API returned HTTP 429".to_string()),
        code => Error::Fetch(format!("GitHub API returned HTTP {} for {}", code, url)),
    }
}
