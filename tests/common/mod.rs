#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use repo_digest::error::{Error, Result};
use repo_digest::fetch::RepoFetcher;
use repo_digest::llm::{LlmGateway, Prompt, ResponseMode};
use repo_digest::types::{RepoIdentity, RepoTree, TreeEntry};

pub const SUMMARY_JSON: &str = r#"{"summary": "A demo service.", "technologies": ["Python", "FastAPI"], "structure": "Code lives in app/."}"#;

/// In-memory repository
pub struct FakeFetcher {
    files: BTreeMap<String, String>,
    failure: Option<fn() -> Error>,
    pub content_requests: Mutex<Vec<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            failure: None,
            content_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn from_map(files: BTreeMap<String, String>) -> Self {
        Self {
            files,
            failure: None,
            content_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: fn() -> Error) -> Self {
        Self {
            files: BTreeMap::new(),
            failure: Some(failure),
            content_requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RepoFetcher for FakeFetcher {
    async fn fetch_tree(&self, _repo: &RepoIdentity) -> Result<RepoTree> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(RepoTree {
            revision: "main".to_string(),
            entries: self
                .files
                .iter()
                .map(|(p, c)| TreeEntry::file(p.clone(), c.len() as u64))
                .collect(),
        })
    }

    async fn fetch_contents(
        &self,
        _repo: &RepoIdentity,
        _revision: &str,
        paths: &[String],
        max_count: usize,
    ) -> Result<BTreeMap<String, String>> {
        self.content_requests.lock().unwrap().push(paths.to_vec());
        Ok(paths
            .iter()
            .take(max_count)
            .filter_map(|p| self.files.get(p).map(|c| (p.clone(), c.clone())))
            .collect())
    }
}

/// Scripted model: per-file prompts get a plain-text summary naming the
/// file (plus `file_note`), everything else gets `summary`.
pub struct FakeGateway {
    summary: String,
    file_note: String,
    failure: Option<fn() -> Error>,
    pub calls: Mutex<Vec<(Prompt, ResponseMode)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::responding(SUMMARY_JSON)
    }

    pub fn responding(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            file_note: String::new(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Appends `note` to every file summary, e.g. to echo a secret back.
    pub fn with_file_note(mut self, note: &str) -> Self {
        self.file_note = note.to_string();
        self
    }

    pub fn failing(failure: fn() -> Error) -> Self {
        Self {
            summary: String::new(),
            file_note: String::new(),
            failure: Some(failure),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _)| p.clone())
            .collect()
    }
}

#[async_trait]
impl LlmGateway for FakeGateway {
    async fn complete(&self, prompt: &Prompt, mode: ResponseMode) -> Result<String> {
        self.calls.lock().unwrap().push((prompt.clone(), mode));
        if let Some(failure) = self.failure {
            return Err(failure());
        }

        if let Some(path) = prompt
            .user
            .lines()
            .next()
            .and_then(|l| l.strip_prefix("File: "))
        {
            return Ok(format!("summary of {}{}", path, self.file_note));
        }
        Ok(self.summary.clone())
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

pub fn github_repo() -> RepoIdentity {
    RepoIdentity::GitHub {
        owner: "octo".to_string(),
        repo: "demo".to_string(),
    }
}
