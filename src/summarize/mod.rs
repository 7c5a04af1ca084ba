//! Summarization request: fetch, classify, extract, rank, redact, budget,
//! assemble, then ask the model.

mod orchestrator;
mod prompts;
mod response;

pub use orchestrator::{needs_multi_pass, FileSummary, SummaryMode};
pub use prompts::{FILE_SUMMARY_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT};
pub use response::{parse_file_summary, parse_summary, strip_fences};

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analyze::{extract_skeleton, rank_files, ImportGraph, ScoringMethod, SourceUnit};
use crate::assemble::{pack, ContextPackage};
use crate::budget::{BpeCounter, BudgetPlan, SlotContent, SlotContents, SlotName, TokenCounter};
use crate::config::{BudgetConfig, Config};
use crate::error::{Error, Result};
use crate::fetch::RepoFetcher;
use crate::llm::LlmGateway;
use crate::scan::{
    categorize, classify_path, fetch_priority, language_breakdown, render_tree, sniff_content,
    Classification, SkipReason,
};
use crate::security::{count_by_kind, redact, RedactionReport};
use crate::types::{
    FileCategory, FileNode, Language, RepoFile, RepoIdentity, RepoTree, SummaryResult, TreeEntry,
};

/// Tree entries that survived classification and the paths chosen for fetching.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub revision: String,
    pub tree_files: usize,
    pub kept: Vec<TreeEntry>,
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Fetch order: category priority, then path depth, then path
    pub to_fetch: Vec<String>,
}

/// Everything known about a repository before the model is called.
#[derive(Debug, Clone)]
pub struct PreparedContext {
    pub selection: Selection,
    pub plan: BudgetPlan,
    /// Ranked source files, best first
    pub ranked: Vec<FileNode>,
    pub scoring: ScoringMethod,
    /// Tokens of all skeleton blocks before budgeting
    pub source_tokens: usize,
    pub package: ContextPackage,
}

/// Outcome of a successful request.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub result: SummaryResult,
    pub mode: SummaryMode,
    pub context: PreparedContext,
    pub file_summaries: Vec<FileSummary>,
    pub synthesis: Option<ContextPackage>,
    pub model_calls: usize,
    /// Model that answered
    pub model: String,
}

/// Entry point tying the pipeline to its two collaborators.
pub struct Summarizer {
    config: Config,
    fetcher: Arc<dyn RepoFetcher>,
    gateway: Arc<dyn LlmGateway>,
    counter: BpeCounter,
}

impl Summarizer {
    pub fn new(
        config: Config,
        fetcher: Arc<dyn RepoFetcher>,
        gateway: Arc<dyn LlmGateway>,
    ) -> Result<Self> {
        config.validate()?;
        let counter = BpeCounter::new(config.budget.tokenizer);
        Ok(Self {
            config,
            fetcher,
            gateway,
            counter,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Summarize `repo`. All or nothing: any collaborator failure or
    /// unparseable model response fails the whole request.
    pub async fn summarize(&self, repo: &RepoIdentity) -> Result<SummaryOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("summarize", run_id = %run_id, repo = %repo);

        async move {
            let context = build_context(repo, self.fetcher.as_ref(), &self.config, &self.counter).await?;
            let done = orchestrator::run(
                self.gateway.as_ref(),
                &context,
                self.config.orchestrator.multi_pass_top_files,
                &self.counter,
            )
            .await?;

            let model = self.gateway.model().to_string();
            info!(
                "Summary ready: {} mode, {} call(s) to {}",
                done.mode.as_str(),
                done.model_calls,
                model
            );
            Ok(SummaryOutcome {
                result: done.result,
                mode: done.mode,
                context,
                file_summaries: done.file_summaries,
                synthesis: done.synthesis,
                model_calls: done.model_calls,
                model,
            })
        }
        .instrument(span)
        .await
    }

    /// Build the context package without calling the model.
    pub async fn build_context(&self, repo: &RepoIdentity) -> Result<PreparedContext> {
        build_context(repo, self.fetcher.as_ref(), &self.config, &self.counter).await
    }
}

/// Fetch what is needed from `fetcher` and prepare the context.
pub async fn build_context(
    repo: &RepoIdentity,
    fetcher: &dyn RepoFetcher,
    config: &Config,
    counter: &dyn TokenCounter,
) -> Result<PreparedContext> {
    let tree = fetcher.fetch_tree(repo).await?;
    let selection = select_files(&tree, &config.budget)?;
    info!(
        "{}: {} of {} files kept, fetching {}",
        repo,
        selection.kept.len(),
        selection.tree_files,
        selection.to_fetch.len()
    );

    let contents = fetcher
        .fetch_contents(
            repo,
            &selection.revision,
            &selection.to_fetch,
            config.budget.max_files,
        )
        .await?;
    info!("Fetched {} of {} files", contents.len(), selection.to_fetch.len());

    let files = load_files(&selection, contents);
    Ok(prepare_context(selection, files, config, counter))
}

/// Classify every file in `tree` and choose which to fetch.
///
/// An empty result is [`Error::InvalidInput`]: nothing is left to summarize.
pub fn select_files(tree: &RepoTree, budget: &BudgetConfig) -> Result<Selection> {
    let max_bytes = budget.max_file_size_bytes();
    let mut selection = Selection {
        revision: tree.revision.clone(),
        ..Selection::default()
    };

    for entry in tree.entries.iter().filter(|e| e.is_file()) {
        selection.tree_files += 1;
        match classify_path(&entry.path, entry.size, max_bytes) {
            Classification::Keep => selection.kept.push(entry.clone()),
            Classification::Skip(reason) => {
                debug!("Skipping {}: {}", entry.path, reason.as_str());
                *selection.skipped.entry(reason).or_insert(0) += 1;
            }
        }
    }

    if selection.tree_files == 0 {
        return Err(Error::InvalidInput("repository has no files".to_string()));
    }
    if selection.kept.is_empty() {
        return Err(Error::InvalidInput(
            "repository has no processable files after filtering".to_string(),
        ));
    }

    let mut order: Vec<(u8, usize, &str)> = selection
        .kept
        .iter()
        .map(|e| {
            (
                fetch_priority(categorize(&e.path)),
                e.path.matches('/').count(),
                e.path.as_str(),
            )
        })
        .collect();
    order.sort_unstable();
    selection.to_fetch = order
        .into_iter()
        .take(budget.max_files)
        .map(|(_, _, path)| path.to_string())
        .collect();

    Ok(selection)
}

/// Turn fetched text into [`RepoFile`]s in fetch order, dropping binary content.
pub fn load_files(selection: &Selection, mut contents: BTreeMap<String, String>) -> Vec<RepoFile> {
    let sizes: BTreeMap<&str, u64> = selection
        .kept
        .iter()
        .map(|e| (e.path.as_str(), e.size))
        .collect();

    selection
        .to_fetch
        .iter()
        .filter_map(|path| {
            let content = contents.remove(path)?;
            let classification = sniff_content(&content);
            if !classification.is_keep() {
                debug!("Skipping {}: {}", path, classification);
                return None;
            }
            Some(RepoFile {
                path: path.clone(),
                size_bytes: sizes.get(path.as_str()).copied().unwrap_or(content.len() as u64),
                language: Language::from_path(path),
                category: categorize(path),
                classification,
                content: Some(content),
            })
        })
        .collect()
}

/// Pure part of the pipeline: identical inputs give a byte-identical package.
pub fn prepare_context(
    selection: Selection,
    files: Vec<RepoFile>,
    config: &Config,
    counter: &dyn TokenCounter,
) -> PreparedContext {
    let plan = BudgetPlan::new(config.budget.total_tokens, &config.budget.slots);
    let mut reports: Vec<RedactionReport> = Vec::new();

    let readme = files
        .iter()
        .filter(|f| f.category == FileCategory::Readme)
        .find_map(|f| f.content.as_deref().map(|c| redact(&f.path, c)))
        .map(|clean| {
            reports.push(clean.report);
            SlotContent::text(&clean.text)
        })
        .unwrap_or_else(SlotContent::empty);

    let config_parts: Vec<String> = files
        .iter()
        .filter(|f| f.category == FileCategory::Config)
        .filter_map(|f| f.content.as_deref().map(|c| (f.path.as_str(), c)))
        .map(|(path, content)| {
            let clean = redact(path, content);
            reports.push(clean.report);
            format!("### {}\n\n{}", path, clean.text.trim_end())
        })
        .collect();
    let config_content = SlotContent::text(&config_parts.join("\n\n"));

    let kept: Vec<&TreeEntry> = selection.kept.iter().collect();
    let mut tree_lines: Vec<String> = language_breakdown(&kept).into_iter().collect();
    tree_lines.extend(render_tree(&kept));
    let tree_clean = redact("(tree)", &tree_lines.join("\n"));
    reports.push(tree_clean.report);
    let tree_content = SlotContent::lines(tree_clean.text.lines().map(str::to_string).collect());

    let (ranked, scoring) = rank_sources(&files);
    reports.extend(ranked.iter().map(|n| n.redactions.clone()));

    let blocks: Vec<String> = ranked
        .iter()
        .map(|n| format!("### {}\n{}", n.path(), n.skeleton.text))
        .collect();
    let sources: Vec<String> = ranked.iter().map(|n| n.path().to_string()).collect();
    let source_tokens = counter.count(&blocks.join("\n\n"));
    let multi_pass = needs_multi_pass(
        source_tokens,
        plan.base(SlotName::Skeletons),
        config.orchestrator.multi_pass_factor,
    );

    let contents = SlotContents {
        readme,
        config: config_content,
        tree: tree_content,
        skeletons: SlotContent::blocks(blocks),
    };
    let package = pack(&plan, contents, reports, &sources, multi_pass, counter);

    let redacted = package.redaction_count();
    if redacted > 0 {
        let kinds: Vec<String> = count_by_kind(&package.redactions)
            .into_iter()
            .map(|(kind, n)| format!("{}={}", kind.as_str(), n))
            .collect();
        warn!("Redacted {} potential secret(s): {}", redacted, kinds.join(", "));
    }
    info!(
        "Context: {} / {} tokens, {} ranked files ({:?}), source {} tokens{}",
        package.total_tokens,
        plan.total,
        ranked.len(),
        scoring,
        source_tokens,
        if multi_pass { ", multi-pass" } else { "" }
    );

    PreparedContext {
        selection,
        plan,
        ranked,
        scoring,
        source_tokens,
        package,
    }
}

/// Skeletonize, graph and rank the files that carry code.
fn rank_sources(files: &[RepoFile]) -> (Vec<FileNode>, ScoringMethod) {
    let code: Vec<(&RepoFile, &str)> = files
        .iter()
        .filter(|f| f.category.is_ranked())
        .filter_map(|f| f.content.as_deref().map(|c| (f, c)))
        .collect();

    let units: Vec<SourceUnit<'_>> = code
        .iter()
        .map(|&(f, content)| SourceUnit {
            path: &f.path,
            language: f.language,
            content,
        })
        .collect();
    let graph = ImportGraph::build(&units);
    let sizes: BTreeMap<String, u64> = code
        .iter()
        .map(|(f, _)| (f.path.clone(), f.size_bytes))
        .collect();
    let ranking = rank_files(&graph, &sizes);

    let by_path: BTreeMap<&str, (&RepoFile, &str)> =
        code.iter().map(|(f, c)| (f.path.as_str(), (*f, *c))).collect();

    let nodes = ranking
        .ordered()
        .into_iter()
        .filter_map(|(path, score)| {
            let (file, content) = by_path.get(path)?;
            let mut skeleton = extract_skeleton(content, file.language);
            let clean = redact(path, &skeleton.text);
            skeleton.text = clean.text;
            Some(FileNode {
                file: (*file).clone(),
                skeleton,
                redactions: clean.report,
                score,
            })
        })
        .collect();

    (nodes, ranking.method)
}
