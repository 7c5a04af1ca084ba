use std::collections::BTreeSet;

use crate::types::Language;

/// An import as written in source, classified by how it names a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRef {
    /// Path relative to the importing file's directory
    Relative(String),
    /// Path fragment matched against the tail of repository paths
    Suffix(String),
    /// Relative to the importer if that exists, otherwise by suffix
    Local(String),
    /// Rust module path rooted at `crate`, `self` or `super`
    RustModule(String),
    /// Go package import path; resolves to every file of the package
    GoPackage(String),
}

/// Maps import references onto a fixed set of repository paths.
pub struct ImportResolver<'a> {
    paths: BTreeSet<&'a str>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(paths: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Repository paths `import` refers to, sorted. Unknown targets
    /// resolve to nothing.
    pub fn resolve(&self, importer: &str, language: Language, import: &ImportRef) -> Vec<String> {
        let expansions = expansions(language);
        let found = match import {
            ImportRef::Relative(rel) => self.resolve_relative(importer, rel, expansions),
            ImportRef::Suffix(suffix) => self.resolve_suffix(suffix, expansions),
            ImportRef::Local(spec) => self
                .resolve_relative(importer, spec, expansions)
                .or_else(|| self.resolve_suffix(spec, expansions)),
            ImportRef::RustModule(module) => self.resolve_rust(importer, module),
            ImportRef::GoPackage(package) => return self.resolve_go(package),
        };
        found.into_iter().collect()
    }

    fn resolve_relative(&self, importer: &str, rel: &str, expansions: &[&str]) -> Option<String> {
        let base = join_relative(parent_dir(importer), rel)?;
        expansions
            .iter()
            .map(|ext| format!("{}{}", base, ext))
            .find(|candidate| self.paths.contains(candidate.as_str()))
    }

    /// Lexicographically smallest path ending in `suffix` plus an expansion.
    fn resolve_suffix(&self, suffix: &str, expansions: &[&str]) -> Option<String> {
        let suffix = suffix.trim_start_matches("./").trim_start_matches('/');
        if suffix.is_empty() {
            return None;
        }
        for ext in expansions {
            let target = format!("{}{}", suffix, ext);
            let tail = format!("/{}", target);
            if let Some(hit) = self
                .paths
                .iter()
                .find(|p| **p == target || p.ends_with(&tail))
            {
                return Some(hit.to_string());
            }
        }
        None
    }

    fn resolve_rust(&self, importer: &str, module: &str) -> Option<String> {
        let mut segments: Vec<&str> = module.split("::").collect();
        let root = segments.first().copied()?;
        segments.remove(0);

        let mut base: Vec<String> = match root {
            "crate" => crate_root(importer).into_iter().map(str::to_string).collect(),
            "self" => module_dir(importer),
            "super" => {
                let mut dir = module_dir(importer);
                dir.pop();
                dir
            }
            _ => return None,
        };

        // Longest module prefix that names a file wins; trailing segments may be items
        let start = base.len();
        base.extend(segments.iter().map(|s| s.to_string()));
        while base.len() > start {
            let stem = base.join("/");
            for candidate in [format!("{}.rs", stem), format!("{}/mod.rs", stem)] {
                if self.paths.contains(candidate.as_str()) {
                    return Some(candidate);
                }
            }
            base.pop();
        }
        None
    }

    /// Every non-test `.go` file in the deepest directory whose path is a
    /// tail of `package`.
    fn resolve_go(&self, package: &str) -> Vec<String> {
        let mut best: Option<&str> = None;
        for path in &self.paths {
            if !path.ends_with(".go") {
                continue;
            }
            let dir = parent_dir(path);
            if dir.is_empty() {
                continue;
            }
            let matches = package == dir || package.ends_with(&format!("/{}", dir));
            if matches && best.map(|b| dir.len() > b.len()).unwrap_or(true) {
                best = Some(dir);
            }
        }

        let Some(dir) = best else {
            return Vec::new();
        };
        self.paths
            .iter()
            .filter(|p| parent_dir(p) == dir && p.ends_with(".go") && !p.ends_with("_test.go"))
            .map(|p| p.to_string())
            .collect()
    }
}

/// Strings appended to an import stem when looking for a file
fn expansions(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => &[".py", "/__init__.py"],
        Language::JavaScript | Language::TypeScript => &[
            "",
            ".ts",
            ".tsx",
            ".js",
            ".jsx",
            ".mjs",
            ".cjs",
            "/index.ts",
            "/index.tsx",
            "/index.js",
            "/index.jsx",
        ],
        Language::Java => &[".java"],
        Language::Kotlin => &[".kt", ".java"],
        Language::CSharp => &[".cs"],
        Language::Ruby => &["", ".rb"],
        Language::Php => &["", ".php"],
        _ => &[""],
    }
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Join `rel` onto `dir`, folding `.` and `..`. `None` if it escapes the root.
fn join_relative(dir: &str, rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Directory of the crate root: everything up to and including `src`.
fn crate_root(importer: &str) -> Vec<&str> {
    let parts: Vec<&str> = importer.split('/').collect();
    match parts.iter().rposition(|p| *p == "src") {
        Some(idx) => parts[..=idx].to_vec(),
        None => Vec::new(),
    }
}

/// Directory holding the children of the module defined by `importer`.
fn module_dir(importer: &str) -> Vec<String> {
    let mut parts: Vec<String> = importer.split('/').map(str::to_string).collect();
    let file = parts.pop().unwrap_or_default();
    if !matches!(file.as_str(), "mod.rs" | "lib.rs" | "main.rs") {
        if let Some(stem) = file.strip_suffix(".rs") {
            parts.push(stem.to_string());
        }
    }
    parts
}
