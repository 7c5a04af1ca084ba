//! File classification: decides which repository paths are noise.
//!
//! Rules are evaluated in a fixed order so every path gets exactly one
//! outcome: vendor/generated, lock file, binary, secret file, oversize.

use serde::Serialize;
use std::fmt;

/// Directory names that hold dependencies, build output or tool caches
const VENDOR_DIRS: &[&str] = &[
    "node_modules",
    "bower_components",
    "jspm_packages",
    ".git",
    ".hg",
    ".svn",
    "dist",
    "build",
    "out",
    "target",
    "venv",
    ".venv",
    "env",
    "virtualenv",
    "__pycache__",
    ".tox",
    ".nox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "vendor",
    "third_party",
    ".idea",
    ".vscode",
    ".next",
    ".nuxt",
    ".svelte-kit",
    "coverage",
    ".coverage",
    "htmlcov",
    ".eggs",
    "Pods",
    "DerivedData",
    ".gradle",
    ".terraform",
    ".cache",
];

/// Generated artifacts recognised by suffix, treated like vendored output
const GENERATED_SUFFIXES: &[&str] = &[".min.js", ".min.css", ".js.map", ".css.map", ".map", ".pb.go", "_pb2.py"];

const LOCKFILE_NAMES: &[&str] = &[
    "yarn.lock",
    "package-lock.json",
    "npm-shrinkwrap.json",
    "pnpm-lock.yaml",
    "bun.lockb",
    "pipfile.lock",
    "poetry.lock",
    "uv.lock",
    "pdm.lock",
    "composer.lock",
    "gemfile.lock",
    "cargo.lock",
    "go.sum",
    "flake.lock",
    "podfile.lock",
    "packages.lock.json",
    "mix.lock",
    "pubspec.lock",
];

const BINARY_EXTENSIONS: &[&str] = &[
    // compiled
    "pyc", "pyo", "so", "o", "a", "lib", "dylib", "dll", "exe", "bin", "class", "jar", "war",
    "wasm", "obj",
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "ico", "webp", "tiff", "psd",
    // audio / video
    "mp3", "mp4", "avi", "mov", "wav", "flac", "ogg", "webm", "mkv",
    // fonts
    "woff", "woff2", "ttf", "eot", "otf",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "rar", "7z",
    // documents and data blobs
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "sqlite", "db", "parquet", "pkl",
];

const BINARY_NAMES: &[&str] = &[".ds_store", "thumbs.db"];

const SECRET_NAMES: &[&str] = &[
    ".env",
    ".netrc",
    ".npmrc",
    ".pypirc",
    ".htpasswd",
    "id_rsa",
    "id_dsa",
    "id_ecdsa",
    "id_ed25519",
    "credentials.json",
    "secrets.yml",
    "secrets.yaml",
];

const SECRET_EXTENSIONS: &[&str] = &["pem", "key", "p12", "pfx", "keystore", "jks"];

/// Suffixes that mark an env file as a shareable template
const ENV_TEMPLATE_SUFFIXES: &[&str] = &[".example", ".sample", ".template", ".dist"];

/// Leading window inspected for NUL bytes when sniffing content
const SNIFF_WINDOW: usize = 8192;

/// Why a path was excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    Vendor,
    Lockfile,
    Binary,
    SecretFile,
    Oversize,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Vendor => "vendor",
            SkipReason::Lockfile => "lockfile",
            SkipReason::Binary => "binary",
            SkipReason::SecretFile => "secret-file",
            SkipReason::Oversize => "oversize",
        }
    }
}

/// Outcome of classifying one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Keep,
    Skip(SkipReason),
}

impl Classification {
    pub fn is_keep(&self) -> bool {
        matches!(self, Classification::Keep)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Keep => write!(f, "keep"),
            Classification::Skip(reason) => write!(f, "skip: {}", reason.as_str()),
        }
    }
}

/// Classify a repository-relative path given its declared size.
pub fn classify_path(path: &str, size: u64, max_size_bytes: u64) -> Classification {
    let normalized = path.replace('\\', "/");
    let name = normalized.rsplit('/').next().unwrap_or("").to_ascii_lowercase();

    if is_vendor_path(&normalized, &name) {
        return Classification::Skip(SkipReason::Vendor);
    }
    if LOCKFILE_NAMES.contains(&name.as_str()) || name.ends_with(".lock") {
        return Classification::Skip(SkipReason::Lockfile);
    }
    if is_binary_name(&name) {
        return Classification::Skip(SkipReason::Binary);
    }
    if is_secret_name(&name) {
        return Classification::Skip(SkipReason::SecretFile);
    }
    if size > max_size_bytes {
        return Classification::Skip(SkipReason::Oversize);
    }

    Classification::Keep
}

/// Re-check fetched text: NUL bytes in the leading window mean binary.
pub fn sniff_content(content: &str) -> Classification {
    if content.as_bytes().iter().take(SNIFF_WINDOW).any(|b| *b == 0) {
        Classification::Skip(SkipReason::Binary)
    } else {
        Classification::Keep
    }
}

fn is_vendor_path(path: &str, name: &str) -> bool {
    let mut segments: Vec<&str> = path.split('/').collect();
    // The last segment is the file itself
    segments.pop();

    let in_vendor_dir = segments
        .iter()
        .any(|seg| VENDOR_DIRS.contains(seg) || seg.ends_with(".egg-info"));

    in_vendor_dir || GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn extension(name: &str) -> Option<&str> {
    match name.rfind('.') {
        Some(idx) if idx > 0 => Some(&name[idx + 1..]),
        _ => None,
    }
}

fn is_binary_name(name: &str) -> bool {
    if BINARY_NAMES.contains(&name) {
        return true;
    }
    extension(name).is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext))
}

fn is_secret_name(name: &str) -> bool {
    if SECRET_NAMES.contains(&name) {
        return true;
    }
    if name.starts_with(".env.") || name.ends_with(".env") {
        return !ENV_TEMPLATE_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix));
    }
    extension(name).is_some_and(|ext| SECRET_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 200 * 1024;

    fn skip(reason: SkipReason) -> Classification {
        Classification::Skip(reason)
    }

    #[test]
    fn test_keeps_ordinary_source() {
        assert_eq!(classify_path("src/app.py", 1200, MAX), Classification::Keep);
        assert_eq!(classify_path("README.md", 10, MAX), Classification::Keep);
        assert_eq!(classify_path("Makefile", 10, MAX), Classification::Keep);
    }

    #[test]
    fn test_vendor_directories() {
        assert_eq!(classify_path("node_modules/react/index.js", 10, MAX), skip(SkipReason::Vendor));
        assert_eq!(classify_path(".git/config", 10, MAX), skip(SkipReason::Vendor));
        assert_eq!(classify_path("pkg/foo.egg-info/PKG-INFO", 10, MAX), skip(SkipReason::Vendor));
        assert_eq!(classify_path("static/app.min.js", 10, MAX), skip(SkipReason::Vendor));
        // A file merely named like a vendor dir is fine
        assert_eq!(classify_path("src/build", 10, MAX), Classification::Keep);
    }

    #[test]
    fn test_lockfiles() {
        assert_eq!(classify_path("Cargo.lock", 10, MAX), skip(SkipReason::Lockfile));
        assert_eq!(classify_path("web/package-lock.json", 10, MAX), skip(SkipReason::Lockfile));
        assert_eq!(classify_path("go.sum", 10, MAX), skip(SkipReason::Lockfile));
    }

    #[test]
    fn test_binary_extensions() {
        assert_eq!(classify_path("docs/logo.PNG", 10, MAX), skip(SkipReason::Binary));
        assert_eq!(classify_path("lib/native.so", 10, MAX), skip(SkipReason::Binary));
        assert_eq!(classify_path(".DS_Store", 10, MAX), skip(SkipReason::Binary));
    }

    #[test]
    fn test_secret_files() {
        assert_eq!(classify_path(".env", 10, MAX), skip(SkipReason::SecretFile));
        assert_eq!(classify_path("deploy/.env.production", 10, MAX), skip(SkipReason::SecretFile));
        assert_eq!(classify_path("certs/server.pem", 10, MAX), skip(SkipReason::SecretFile));
        assert_eq!(classify_path(".env.example", 10, MAX), Classification::Keep);
    }

    #[test]
    fn test_oversize() {
        assert_eq!(classify_path("data/big.py", MAX + 1, MAX), skip(SkipReason::Oversize));
        assert_eq!(classify_path("data/edge.py", MAX, MAX), Classification::Keep);
    }

    #[test]
    fn test_rule_priority() {
        // vendor beats everything else
        assert_eq!(classify_path("vendor/.env", MAX * 2, MAX), skip(SkipReason::Vendor));
        // lockfile beats oversize
        assert_eq!(classify_path("yarn.lock", MAX * 2, MAX), skip(SkipReason::Lockfile));
        // binary beats secret
        assert_eq!(classify_path("keys/id.p12.zip", 10, MAX), skip(SkipReason::Binary));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let paths = ["a/b.rs", "node_modules/x", ".env", "x.lock", "y.png", "z.py"];
        for path in paths {
            let first = classify_path(path, 500_000, MAX);
            for _ in 0..5 {
                assert_eq!(classify_path(path, 500_000, MAX), first);
            }
        }
    }

    #[test]
    fn test_sniff_content() {
        assert_eq!(sniff_content("plain text"), Classification::Keep);
        assert_eq!(sniff_content("PK\u{0}\u{3}"), skip(SkipReason::Binary));
    }

    #[test]
    fn test_display() {
        assert_eq!(Classification::Keep.to_string(), "keep");
        assert_eq!(skip(SkipReason::SecretFile).to_string(), "skip: secret-file");
    }
}
