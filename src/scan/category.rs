use crate::types::FileCategory;

const CONFIG_NAMES: &[&str] = &[
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "requirements.txt",
    "requirements.in",
    "pipfile",
    "package.json",
    "tsconfig.json",
    "deno.json",
    "webpack.config.js",
    "vite.config.ts",
    "vite.config.js",
    "cargo.toml",
    "go.mod",
    "gemfile",
    "build.gradle",
    "build.gradle.kts",
    "settings.gradle",
    "pom.xml",
    "composer.json",
    "makefile",
    "cmakelists.txt",
    "justfile",
    "dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yaml",
    ".env.example",
    "tox.ini",
    ".flake8",
    "ruff.toml",
    ".prettierrc",
    "mix.exs",
    "pubspec.yaml",
    "package.swift",
];

const ENTRY_POINT_NAMES: &[&str] = &[
    "main.py",
    "__main__.py",
    "app.py",
    "manage.py",
    "wsgi.py",
    "asgi.py",
    "server.py",
    "cli.py",
    "index.js",
    "index.ts",
    "index.tsx",
    "server.js",
    "server.ts",
    "cli.js",
    "main.go",
    "main.rs",
    "lib.rs",
    "main.c",
    "main.cpp",
    "program.cs",
    "main.swift",
    "main.kt",
    "application.java",
];

const TEST_MARKERS: &[&str] = &["tests/", "test/", "spec/", "__tests__/", "testing/"];
const TEST_NAME_MARKERS: &[&str] = &["test_", "_test.", ".test.", ".spec.", "_spec."];
const DOCS_MARKERS: &[&str] = &["docs/", "doc/", "documentation/"];

/// Assign a [`FileCategory`] from file name and path conventions.
pub fn categorize(path: &str) -> FileCategory {
    let path_lower = path.to_ascii_lowercase();
    let name = path_lower.rsplit('/').next().unwrap_or("");
    let stem = name.split('.').next().unwrap_or("");

    if stem == "readme" {
        return FileCategory::Readme;
    }
    if CONFIG_NAMES.contains(&name) || (name.starts_with("requirements") && name.ends_with(".txt")) {
        return FileCategory::Config;
    }
    if ENTRY_POINT_NAMES.contains(&name) {
        return FileCategory::EntryPoint;
    }

    let dir_prefixed = format!("/{}", path_lower);
    if TEST_MARKERS.iter().any(|m| dir_prefixed.contains(&format!("/{}", m)))
        || TEST_NAME_MARKERS.iter().any(|m| name.contains(m))
    {
        return FileCategory::Test;
    }
    if DOCS_MARKERS.iter().any(|m| dir_prefixed.contains(&format!("/{}", m))) {
        return FileCategory::Docs;
    }

    FileCategory::Source
}

/// Lower values are fetched first.
pub fn fetch_priority(category: FileCategory) -> u8 {
    match category {
        FileCategory::Readme => 0,
        FileCategory::Config => 1,
        FileCategory::EntryPoint => 2,
        FileCategory::Source => 3,
        FileCategory::Docs => 4,
        FileCategory::Test => 5,
    }
}
