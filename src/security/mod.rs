//! Security sentinel: redacts secret-shaped substrings from every fragment
//! before it is placed into the context.
//!
//! The original secret value never leaves [`redact`]; reports only carry
//! the pattern kind and the character span it occupied.

mod patterns;

pub use patterns::PatternKind;

use serde::Serialize;
use std::collections::BTreeMap;

/// Literal placeholder substituted for every detected secret
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// One replaced span, in characters of the original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Redaction {
    pub kind: PatternKind,
    pub start: usize,
    pub end: usize,
}

/// Redactions applied to a single fragment, in text order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactionReport {
    /// Label of the fragment, usually a repository path
    pub source: String,
    pub redactions: Vec<Redaction>,
}

impl RedactionReport {
    pub fn is_empty(&self) -> bool {
        self.redactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.redactions.len()
    }
}

/// Sanitized text plus what was removed from it
#[derive(Debug, Clone)]
pub struct Redacted {
    pub text: String,
    pub report: RedactionReport,
}

/// Replace every secret in `text` with [`REDACTION_MARKER`].
///
/// Overlapping matches are merged into a single span so each marker covers
/// one region, and re-running on the output finds nothing.
pub fn redact(source: &str, text: &str) -> Redacted {
    let mut matches = patterns::scan(text);
    matches.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    // Merge overlaps; the earliest (then longest, then catalogue-first) kind wins
    let mut merged: Vec<patterns::SecretMatch> = Vec::with_capacity(matches.len());
    for m in matches {
        match merged.last_mut() {
            Some(last) if m.start < last.end => {
                last.end = last.end.max(m.end);
            }
            _ => merged.push(m),
        }
    }

    let mut clean = String::with_capacity(text.len());
    let mut redactions = Vec::with_capacity(merged.len());
    let mut cursor = 0;
    let mut char_cursor = 0;

    for m in &merged {
        let before = &text[cursor..m.start];
        clean.push_str(before);
        clean.push_str(REDACTION_MARKER);

        let start = char_cursor + before.chars().count();
        let end = start + text[m.start..m.end].chars().count();
        redactions.push(Redaction {
            kind: m.kind,
            start,
            end,
        });

        cursor = m.end;
        char_cursor = end;
    }
    clean.push_str(&text[cursor..]);

    Redacted {
        text: clean,
        report: RedactionReport {
            source: source.to_string(),
            redactions,
        },
    }
}

/// Count redactions across reports, grouped by kind.
pub fn count_by_kind(reports: &[RedactionReport]) -> BTreeMap<PatternKind, usize> {
    let mut counts = BTreeMap::new();
    for redaction in reports.iter().flat_map(|r| r.redactions.iter()) {
        *counts.entry(redaction.kind).or_insert(0) += 1;
    }
    counts
}
