//! Single-pass vs. multi-pass summarization.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;

use super::prompts::{file_summary_prompt, summary_prompt, synthesis_prompt};
use super::response::{parse_file_summary, parse_summary};
use super::PreparedContext;
use crate::assemble::{pack, ContextPackage};
use crate::budget::{fit_lines, SlotContent, SlotContents, SlotName, TokenCounter};
use crate::error::Result;
use crate::llm::{LlmGateway, ResponseMode};
use crate::security::redact;
use crate::types::SummaryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    SinglePass,
    MultiPass,
}

impl SummaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMode::SinglePass => "single-pass",
            SummaryMode::MultiPass => "multi-pass",
        }
    }
}

/// Source content beyond `factor` times the Skeletons base needs two passes.
pub fn needs_multi_pass(source_tokens: usize, skeleton_base: usize, factor: f64) -> bool {
    source_tokens as f64 > factor * skeleton_base as f64
}

/// Pass-1 result for one file, already redacted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub summary: String,
}

/// What the orchestrator sent and got back.
#[derive(Debug, Clone)]
pub struct Orchestrated {
    pub result: SummaryResult,
    pub mode: SummaryMode,
    pub file_summaries: Vec<FileSummary>,
    /// Package sent in Pass 2
    pub synthesis: Option<ContextPackage>,
    pub model_calls: usize,
}

pub(crate) async fn run(
    gateway: &dyn LlmGateway,
    prepared: &PreparedContext,
    top_files: usize,
    counter: &dyn TokenCounter,
) -> Result<Orchestrated> {
    if !prepared.package.multi_pass {
        info!("Single-pass summarization, {} tokens", prepared.package.total_tokens);
        let raw = gateway
            .complete(&summary_prompt(&prepared.package.payload), ResponseMode::Json)
            .await?;
        return Ok(Orchestrated {
            result: parse_summary(&raw)?,
            mode: SummaryMode::SinglePass,
            file_summaries: Vec::new(),
            synthesis: None,
            model_calls: 1,
        });
    }

    let file_summaries = summarize_files(gateway, prepared, top_files, counter).await?;
    let synthesis = synthesis_package(prepared, &file_summaries, counter);
    info!(
        "Synthesis pass over {} file summaries, {} tokens",
        file_summaries.len(),
        synthesis.total_tokens
    );

    let raw = gateway
        .complete(&synthesis_prompt(&synthesis.payload), ResponseMode::Json)
        .await?;

    Ok(Orchestrated {
        result: parse_summary(&raw)?,
        mode: SummaryMode::MultiPass,
        model_calls: file_summaries.len() + 1,
        file_summaries,
        synthesis: Some(synthesis),
    })
}

/// Pass 1: one isolated request per top-ranked file, issued concurrently.
async fn summarize_files(
    gateway: &dyn LlmGateway,
    prepared: &PreparedContext,
    top_files: usize,
    counter: &dyn TokenCounter,
) -> Result<Vec<FileSummary>> {
    let quota = prepared.plan.base(SlotName::Skeletons);

    let requests: Vec<(String, crate::llm::Prompt)> = prepared
        .ranked
        .iter()
        .filter_map(|node| node.file.content.as_deref().map(|c| (node.path(), c)))
        .take(top_files)
        .map(|(path, content)| {
            let clean = redact(path, content).text;
            let fitted = fit_lines(&clean, quota, counter);
            (path.to_string(), file_summary_prompt(path, &fitted))
        })
        .collect();

    info!("Multi-pass: summarizing {} files individually", requests.len());

    let summaries = try_join_all(requests.iter().map(|(path, prompt)| async move {
        let raw = gateway.complete(prompt, ResponseMode::Text).await?;
        let summary = parse_file_summary(&raw)?;
        Ok::<_, crate::error::Error>(FileSummary {
            path: path.clone(),
            summary: redact(path, &summary).text,
        })
    }))
    .await?;

    Ok(summaries)
}

/// Pass 2 context: the first package's README, Config and Tree sections with
/// the file summaries in place of skeletons.
fn synthesis_package(
    prepared: &PreparedContext,
    summaries: &[FileSummary],
    counter: &dyn TokenCounter,
) -> ContextPackage {
    let section = |name: SlotName| {
        prepared
            .package
            .slot(name)
            .map(|s| s.content.as_str())
            .unwrap_or("")
    };

    let tree_lines: Vec<String> = section(SlotName::Tree).lines().map(str::to_string).collect();
    let contents = SlotContents {
        readme: SlotContent::text(section(SlotName::Readme)),
        config: SlotContent::text(section(SlotName::Config)),
        tree: SlotContent::lines(tree_lines),
        skeletons: SlotContent::blocks(
            summaries
                .iter()
                .map(|s| format!("### {}\n{}", s.path, s.summary))
                .collect(),
        ),
    };

    let sources: Vec<String> = summaries.iter().map(|s| s.path.clone()).collect();
    pack(
        &prepared.plan,
        contents,
        prepared.package.redactions.clone(),
        &sources,
        true,
        counter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_pass_threshold() {
        // Skeletons base 400, factor 2
        assert!(needs_multi_pass(1400, 400, 2.0));
        assert!(!needs_multi_pass(600, 400, 2.0));
        assert!(!needs_multi_pass(800, 400, 2.0));
        assert!(needs_multi_pass(801, 400, 2.0));
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(SummaryMode::SinglePass.as_str(), "single-pass");
        assert_eq!(
            serde_json::to_value(SummaryMode::MultiPass).unwrap(),
            "multi_pass"
        );
    }
}
