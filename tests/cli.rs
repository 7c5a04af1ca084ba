use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn repo_digest(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("repo-digest").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("GITHUB_TOKEN")
        .env_remove("REPO_DIGEST_MAX_TOKENS")
        .env_remove("RUST_LOG");
    cmd
}

fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("README.md"), "# Sample\n\nCLI fixture.\n").unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(
        dir.path().join("pkg/core.py"),
        "def handler(event, context):\n    \"\"\"Handle one event.\"\"\"\n    return event\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("pkg/config.py"),
        "API_KEY = \"AKIA1234567890ABCDEF\"\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    repo_digest(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--context-only"))
        .stdout(predicate::str::contains("--max-tokens"));
}

#[test]
fn test_invalid_repository_exits_with_2() {
    let dir = TempDir::new().unwrap();
    repo_digest(&dir)
        .arg("https://gitlab.com/octo/demo")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid input"));
}

#[test]
fn test_context_only_prints_payload() {
    let workdir = TempDir::new().unwrap();
    let repo = sample_repo();
    repo_digest(&workdir)
        .arg(repo.path())
        .arg("--context-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("## README"))
        .stdout(predicate::str::contains("## Directory Structure"))
        .stdout(predicate::str::contains("def handler(event, context)"))
        .stdout(predicate::str::contains("AKIA1234567890ABCDEF").not());
}

#[test]
fn test_context_only_json_report() {
    let workdir = TempDir::new().unwrap();
    let repo = sample_repo();
    let output = repo_digest(&workdir)
        .arg(repo.path())
        .args(["--context-only", "--format", "json", "--max-tokens", "2000"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["budget"]["total"], 2000);
    assert_eq!(report["files"]["kept"], 3);
    assert_eq!(report["fingerprint"].as_str().unwrap().len(), 64);
    assert!(report["redactions"].as_object().unwrap().len() >= 1);
}

#[test]
fn test_config_file_in_working_directory() {
    let workdir = TempDir::new().unwrap();
    fs::write(
        workdir.path().join("repo-digest.toml"),
        "[budget]\ntotal_tokens = 1234\n",
    )
    .unwrap();
    let repo = sample_repo();
    let output = repo_digest(&workdir)
        .arg(repo.path())
        .args(["--context-only", "--format", "json"])
        .output()
        .unwrap();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["budget"]["total"], 1234);
}

#[test]
fn test_invalid_config_exits_with_2() {
    let workdir = TempDir::new().unwrap();
    let repo = sample_repo();
    repo_digest(&workdir)
        .arg(repo.path())
        .args(["--context-only", "--max-tokens", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_api_key_exits_with_2() {
    let workdir = TempDir::new().unwrap();
    let repo = sample_repo();
    repo_digest(&workdir)
        .arg(repo.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}
