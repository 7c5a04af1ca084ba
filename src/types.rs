use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::analyze::Skeleton;
use crate::error::{Error, Result};
use crate::scan::Classification;
use crate::security::RedactionReport;

static GITHUB_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$")
        .unwrap()
});

/// Which repository to summarize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoIdentity {
    /// A public repository on github.com
    GitHub { owner: String, repo: String },
    /// A directory on the local filesystem
    Local(PathBuf),
}

impl RepoIdentity {
    /// Parse a GitHub URL (`https://github.com/<owner>/<repo>`) or an existing
    /// local directory path.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput(
                "repository identity must not be empty".to_string(),
            ));
        }

        if let Some(cap) = GITHUB_URL_PATTERN.captures(input) {
            return Ok(RepoIdentity::GitHub {
                owner: cap[1].to_string(),
                repo: cap[2].to_string(),
            });
        }

        let path = Path::new(input);
        if !input.contains("://") && path.is_dir() {
            return Ok(RepoIdentity::Local(path.to_path_buf()));
        }

        Err(Error::InvalidInput(format!(
            "'{}' is neither a GitHub repository URL (https://github.com/<owner>/<repo>) nor a local directory",
            input
        )))
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoIdentity::GitHub { owner, repo } => write!(f, "{}/{}", owner, repo),
            RepoIdentity::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

/// One stub from the repository host's tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub size: u64,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            kind: EntryKind::File,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: 0,
            kind: EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Tree listing at a fixed revision (branch, commit or "working tree").
#[derive(Debug, Clone)]
pub struct RepoTree {
    pub revision: String,
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Kotlin,
    CSharp,
    Swift,
    Go,
    Rust,
    Ruby,
    Php,
    C,
    Cpp,
    Shell,
    Markdown,
    Toml,
    Yaml,
    Json,
    Html,
    Css,
    Unknown,
}

impl Language {
    pub fn from_path(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        let ext = match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx + 1..].to_ascii_lowercase(),
            _ => return Language::Unknown,
        };

        match ext.as_str() {
            "py" | "pyw" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "cs" => Language::CSharp,
            "swift" => Language::Swift,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "c" | "h" => Language::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "sh" | "bash" | "zsh" => Language::Shell,
            "md" | "markdown" | "rst" => Language::Markdown,
            "toml" => Language::Toml,
            "yaml" | "yml" => Language::Yaml,
            "json" => Language::Json,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "sass" | "less" => Language::Css,
            _ => Language::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::Kotlin => "Kotlin",
            Language::CSharp => "C#",
            Language::Swift => "Swift",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Shell => "Shell",
            Language::Markdown => "Markdown",
            Language::Toml => "TOML",
            Language::Yaml => "YAML",
            Language::Json => "JSON",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Unknown => "unknown",
        }
    }

    /// Programming languages, as opposed to markup and data formats
    pub fn is_code(&self) -> bool {
        !matches!(
            self,
            Language::Markdown
                | Language::Toml
                | Language::Yaml
                | Language::Json
                | Language::Html
                | Language::Css
                | Language::Unknown
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Role of a kept file within the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Readme,
    Config,
    EntryPoint,
    Source,
    Docs,
    Test,
}

impl FileCategory {
    /// Whether files of this category are skeletonized and ranked
    pub fn is_ranked(&self) -> bool {
        matches!(
            self,
            FileCategory::EntryPoint | FileCategory::Source | FileCategory::Test
        )
    }
}

/// A repository file after classification.
#[derive(Debug, Clone)]
pub struct RepoFile {
    pub path: String,
    pub size_bytes: u64,
    pub language: Language,
    pub category: FileCategory,
    pub classification: Classification,
    /// Raw text; `None` when the file was not fetched
    pub content: Option<String>,
}

/// A ranked source file carrying its skeleton and redaction report.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub file: RepoFile,
    pub skeleton: Skeleton,
    pub redactions: RedactionReport,
    pub score: f64,
}

impl FileNode {
    pub fn path(&self) -> &str {
        &self.file.path
    }
}

/// Final structured summary of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub technologies: Vec<String>,
    pub structure: String,
}
