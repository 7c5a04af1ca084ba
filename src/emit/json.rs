use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyze::ScoringMethod;
use crate::assemble::ContextPackage;
use crate::budget::BudgetSlot;
use crate::scan::SkipReason;
use crate::security::{count_by_kind, PatternKind};
use crate::summarize::{FileSummary, PreparedContext, SummaryMode, SummaryOutcome};
use crate::types::SummaryResult;

/// Machine-readable record of one run.
#[derive(Serialize)]
pub struct RunReport {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub repository: String,
    pub revision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SummaryMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub files: FileStats,
    pub scoring: ScoringMethod,
    pub budget: BudgetReport,
    pub redactions: BTreeMap<PatternKind, usize>,
    pub ranked_files: Vec<RankedFile>,
    pub omitted_files: Vec<String>,
    pub fingerprint: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_summaries: Vec<FileSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SummaryResult>,
}

#[derive(Serialize)]
pub struct FileStats {
    pub in_tree: usize,
    pub kept: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub fetched: usize,
    pub ranked: usize,
}

#[derive(Serialize)]
pub struct BudgetReport {
    pub total: usize,
    pub used: usize,
    pub source_tokens: usize,
    pub multi_pass: bool,
    pub slots: Vec<BudgetSlot>,
}

#[derive(Serialize)]
pub struct RankedFile {
    pub path: String,
    pub score: f64,
    pub skeleton: crate::analyze::SkeletonStatus,
}

impl RunReport {
    /// Report for a context built without calling the model.
    pub fn from_context(repository: &str, context: &PreparedContext) -> Self {
        Self::build(repository, context, &context.package)
    }

    pub fn from_outcome(repository: &str, outcome: &SummaryOutcome) -> Self {
        let mut report = Self::build(repository, &outcome.context, &outcome.context.package);
        report.mode = Some(outcome.mode);
        report.model = Some(outcome.model.clone());
        report.file_summaries = outcome.file_summaries.clone();
        report.result = Some(outcome.result.clone());
        report
    }

    fn build(repository: &str, context: &PreparedContext, package: &ContextPackage) -> Self {
        let selection = &context.selection;
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            repository: repository.to_string(),
            revision: selection.revision.clone(),
            mode: None,
            model: None,
            files: FileStats {
                in_tree: selection.tree_files,
                kept: selection.kept.len(),
                skipped: selection.skipped.clone(),
                fetched: selection.to_fetch.len(),
                ranked: context.ranked.len(),
            },
            scoring: context.scoring,
            budget: BudgetReport {
                total: context.plan.total,
                used: package.total_tokens,
                source_tokens: context.source_tokens,
                multi_pass: package.multi_pass,
                slots: package.slots.clone(),
            },
            redactions: count_by_kind(&package.redactions),
            ranked_files: context
                .ranked
                .iter()
                .map(|n| RankedFile {
                    path: n.path().to_string(),
                    score: n.score,
                    skeleton: n.skeleton.status,
                })
                .collect(),
            omitted_files: package.omitted_files.clone(),
            fingerprint: package.fingerprint(),
            file_summaries: Vec::new(),
            result: None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
