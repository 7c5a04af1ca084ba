mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{github_repo, FakeFetcher, FakeGateway, SUMMARY_JSON};
use repo_digest::analyze::ScoringMethod;
use repo_digest::budget::{BpeCounter, SlotName, TokenCounter};
use repo_digest::config::Config;
use repo_digest::error::{Error, ErrorKind};
use repo_digest::llm::ResponseMode;
use repo_digest::security::REDACTION_MARKER;
use repo_digest::summarize::{build_context, SummaryMode};
use repo_digest::Summarizer;

fn small_repo() -> FakeFetcher {
    FakeFetcher::new(&[
        ("README.md", "# Demo\n\nA demo service.\n"),
        ("pyproject.toml", "[project]\nname = \"demo\"\n"),
        (
            "app/foo.py",
            "class Foo:\n    def bar(self):\n        \"\"\"doc\"\"\"\n        return 42\n",
        ),
        (
            "app/main.py",
            "from app.foo import Foo\n\n\ndef main():\n    return Foo().bar()\n",
        ),
        (
            "app/settings.py",
            "AWS_SECRET_ACCESS_KEY = \"AKIA1234567890ABCDEF\"\nDEBUG = True\n",
        ),
        ("assets/logo.png", "not really a png"),
        ("poetry.lock", "# lock"),
    ])
}

const AWS_KEY: &str = "AKIA1234567890ABCDEF";

fn large_repo() -> BTreeMap<String, String> {
    large_repo_with_header("")
}

/// Twelve large service modules, each starting with `header`.
fn large_repo_with_header(header: &str) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    files.insert("README.md".to_string(), "# Big\n\nA large project.\n".to_string());
    for n in 0..12 {
        let mut src = format!(
            "{}class Service{}:\n    \"\"\"Service number {}.\"\"\"\n",
            header, n, n
        );
        for i in 0..40 {
            src.push_str(&format!(
                "\n    def method_{}(self, value: int, scale: float = 1.0) -> float:\n        \"\"\"Scale value and add offset {}.\"\"\"\n        return value * scale + {}\n",
                i, i, i
            ));
        }
        files.insert(format!("app/service_{:02}.py", n), src);
    }
    files
}

fn summarizer(fetcher: FakeFetcher, gateway: Arc<FakeGateway>, config: Config) -> Summarizer {
    Summarizer::new(config, Arc::new(fetcher), gateway).unwrap()
}

#[tokio::test]
async fn test_single_pass_summary() {
    let gateway = Arc::new(FakeGateway::new());
    let s = summarizer(small_repo(), Arc::clone(&gateway), Config::default());

    let outcome = s.summarize(&github_repo()).await.unwrap();

    assert_eq!(outcome.mode, SummaryMode::SinglePass);
    assert_eq!(outcome.model_calls, 1);
    assert_eq!(outcome.result.summary, "A demo service.");
    assert_eq!(outcome.result.technologies, vec!["Python", "FastAPI"]);

    let calls = gateway.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (prompt, mode) = &calls[0];
    assert_eq!(*mode, ResponseMode::Json);
    assert!(prompt.user.contains("## README"));
    assert!(prompt.user.contains("class Foo"));
    assert!(prompt.user.contains("def bar"));
    assert!(prompt.user.contains("\"\"\"doc\"\"\""));
    assert!(!prompt.user.contains("return 42"));
    assert!(!prompt.user.contains("AKIA1234567890ABCDEF"));
    assert!(prompt.user.contains(REDACTION_MARKER));
    assert!(!prompt.user.contains("logo.png"));
    assert!(!prompt.user.contains("poetry.lock"));
}

#[tokio::test]
async fn test_imported_file_ranks_first() {
    let gateway = Arc::new(FakeGateway::new());
    let s = summarizer(small_repo(), gateway, Config::default());

    let context = s.build_context(&github_repo()).await.unwrap();
    assert_eq!(context.scoring, ScoringMethod::Centrality);
    assert_eq!(context.ranked[0].path(), "app/foo.py");
    assert!(context.package.redaction_count() >= 1);
}

#[tokio::test]
async fn test_context_is_deterministic() {
    let config = Config::default();
    let counter = BpeCounter::default();
    let fetcher = small_repo();

    let a = build_context(&github_repo(), &fetcher, &config, &counter).await.unwrap();
    let b = build_context(&github_repo(), &fetcher, &config, &counter).await.unwrap();

    assert_eq!(a.package.payload, b.package.payload);
    assert_eq!(a.package.fingerprint(), b.package.fingerprint());
    assert_eq!(a.package.total_tokens, b.package.total_tokens);
}

#[tokio::test]
async fn test_budget_holds_with_rollover() {
    let mut config = Config::default();
    config.budget.total_tokens = 1000;
    let counter = BpeCounter::default();
    let fetcher = FakeFetcher::from_map(large_repo());

    let context = build_context(&github_repo(), &fetcher, &config, &counter)
        .await
        .unwrap();
    let slots = &context.package.slots;

    assert_eq!(context.plan.base(SlotName::Readme), 300);
    assert_eq!(context.plan.base(SlotName::Skeletons), 400);
    assert!(context.package.total_tokens <= 1000);
    assert_eq!(
        context.package.total_tokens,
        counter.count(&context.package.payload)
    );
    for pair in slots.windows(2) {
        assert_eq!(pair[1].carried_in, pair[0].unused());
    }
    assert!(!context.package.omitted_files.is_empty());
    assert!(context.package.multi_pass);
}

#[tokio::test]
async fn test_multi_pass_summary() {
    let mut config = Config::default();
    config.budget.total_tokens = 2000;
    let gateway = Arc::new(FakeGateway::new());
    let s = summarizer(
        FakeFetcher::from_map(large_repo()),
        Arc::clone(&gateway),
        config,
    );

    let outcome = s.summarize(&github_repo()).await.unwrap();

    assert_eq!(outcome.mode, SummaryMode::MultiPass);
    assert_eq!(outcome.file_summaries.len(), 8);
    assert_eq!(outcome.model_calls, 9);
    assert_eq!(outcome.result.summary, "A demo service.");

    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 9);
    let file_prompts = prompts.iter().filter(|p| p.user.starts_with("File: ")).count();
    assert_eq!(file_prompts, 8);
    let calls = gateway.calls.lock().unwrap();
    for (prompt, mode) in calls.iter() {
        let expected = if prompt.user.starts_with("File: ") {
            ResponseMode::Text
        } else {
            ResponseMode::Json
        };
        assert_eq!(*mode, expected);
    }
    drop(calls);
    assert_eq!(outcome.model, "fake-model");

    let synthesis = outcome.synthesis.as_ref().unwrap();
    assert!(synthesis.multi_pass);
    assert!(synthesis.payload.contains("summary of app/service_"));
    assert!(synthesis.payload.contains("## README"));
    assert!(synthesis.total_tokens <= 2000);
    assert_eq!(
        synthesis.total_tokens,
        BpeCounter::default().count(&synthesis.payload)
    );

    let last = prompts.last().unwrap();
    assert!(last.user.contains("per-file summaries"));
}

#[tokio::test]
async fn test_multi_pass_never_sends_secrets() {
    let mut config = Config::default();
    config.budget.total_tokens = 2000;
    let header = format!("AWS_ACCESS_KEY_ID = \"{}\"\n\n", AWS_KEY);
    let gateway = Arc::new(
        FakeGateway::new().with_file_note(&format!(", uses key {}", AWS_KEY)),
    );
    let s = summarizer(
        FakeFetcher::from_map(large_repo_with_header(&header)),
        Arc::clone(&gateway),
        config,
    );

    let outcome = s.summarize(&github_repo()).await.unwrap();
    assert_eq!(outcome.mode, SummaryMode::MultiPass);

    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 9);
    for prompt in &prompts {
        assert!(!prompt.user.contains(AWS_KEY));
        assert!(!prompt.system.contains(AWS_KEY));
    }
    let file_prompts: Vec<_> = prompts.iter().filter(|p| p.user.starts_with("File: ")).collect();
    assert_eq!(file_prompts.len(), 8);
    for prompt in &file_prompts {
        assert!(prompt.user.contains(&format!("AWS_ACCESS_KEY_ID = \"{}\"", REDACTION_MARKER)));
    }

    for summary in &outcome.file_summaries {
        assert!(!summary.summary.contains(AWS_KEY));
        assert!(summary.summary.contains(REDACTION_MARKER));
    }
    let synthesis = outcome.synthesis.as_ref().unwrap();
    assert!(!synthesis.payload.contains(AWS_KEY));
    assert!(synthesis.payload.contains(REDACTION_MARKER));
}

#[tokio::test]
async fn test_fetch_errors_propagate() {
    let gateway = Arc::new(FakeGateway::new());
    let s = summarizer(
        FakeFetcher::failing(|| Error::NotFound("octo/demo".into())),
        Arc::clone(&gateway),
        Config::default(),
    );

    let err = s.summarize(&github_repo()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(gateway.prompts().is_empty());
}

#[tokio::test]
async fn test_gateway_failure_is_fatal() {
    let gateway = Arc::new(FakeGateway::failing(|| Error::Gateway("unreachable".into())));
    let s = summarizer(small_repo(), gateway, Config::default());

    let err = s.summarize(&github_repo()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Gateway);
}

#[tokio::test]
async fn test_malformed_response_is_fatal() {
    let gateway = Arc::new(FakeGateway::responding("I think this repo is nice."));
    let s = summarizer(small_repo(), Arc::clone(&gateway), Config::default());

    let err = s.summarize(&github_repo()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Gateway);
    assert_eq!(gateway.prompts().len(), 1);
}

#[tokio::test]
async fn test_nothing_left_after_filtering() {
    let fetcher = FakeFetcher::new(&[
        ("node_modules/x/index.js", "module.exports = 1"),
        ("logo.png", "png"),
        (".env", "SECRET=1"),
    ]);
    let s = summarizer(fetcher, Arc::new(FakeGateway::new()), Config::default());

    let err = s.summarize(&github_repo()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_fetch_is_capped() {
    let mut config = Config::default();
    config.budget.max_files = 3;
    let fetcher = FakeFetcher::from_map(large_repo());

    let context = build_context(&github_repo(), &fetcher, &config, &BpeCounter::default())
        .await
        .unwrap();

    let requests = fetcher.content_requests.lock().unwrap();
    assert_eq!(requests[0].len(), 3);
    assert_eq!(requests[0][0], "README.md");
    assert_eq!(context.ranked.len(), 2);
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = Config::default();
    config.budget.total_tokens = 0;
    let result = Summarizer::new(
        config,
        Arc::new(small_repo()),
        Arc::new(FakeGateway::responding(SUMMARY_JSON)),
    );
    assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::InvalidInput));
}
