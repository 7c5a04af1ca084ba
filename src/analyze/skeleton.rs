use serde::Serialize;

use super::imports::ImportRef;
use super::lang::{self, pattern, python, LanguageParser};
use crate::types::Language;

/// Lines kept by the raw excerpt fallback
pub const EXCERPT_LINES: usize = 60;
/// Characters kept by the raw excerpt fallback
pub const EXCERPT_CHARS: usize = 2000;

/// How a file's skeleton was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkeletonStatus {
    /// Declarations and docs extracted
    Extracted,
    /// No structure recognised; leading raw excerpt instead
    Excerpt,
    /// Extraction failed on malformed source; leading raw excerpt instead
    Unavailable,
}

/// Compact, body-free view of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skeleton {
    pub text: String,
    pub status: SkeletonStatus,
}

impl Skeleton {
    fn excerpt(content: &str, status: SkeletonStatus) -> Self {
        Self {
            text: raw_excerpt(content),
            status,
        }
    }

    pub fn is_extracted(&self) -> bool {
        self.status == SkeletonStatus::Extracted
    }
}

/// Which extractor handles a language.
#[derive(Clone, Copy)]
pub enum ExtractionStrategy {
    /// Real syntax tree
    Parsed,
    /// Declaration patterns
    Pattern(&'static dyn LanguageParser),
    /// Raw excerpt only
    Unknown,
}

impl ExtractionStrategy {
    pub fn for_language(language: Language) -> Self {
        if language == Language::Python {
            return ExtractionStrategy::Parsed;
        }
        match lang::parser_for(language) {
            Some(parser) => ExtractionStrategy::Pattern(parser),
            None => ExtractionStrategy::Unknown,
        }
    }
}

/// Extract a skeleton. Never fails, and the result is never longer than
/// `content` in characters.
pub fn extract_skeleton(content: &str, language: Language) -> Skeleton {
    let skeleton = match ExtractionStrategy::for_language(language) {
        ExtractionStrategy::Parsed => match python::skeleton(content) {
            Some(text) if !text.trim().is_empty() => Skeleton {
                text,
                status: SkeletonStatus::Extracted,
            },
            Some(_) => Skeleton::excerpt(content, SkeletonStatus::Excerpt),
            None => Skeleton::excerpt(content, SkeletonStatus::Unavailable),
        },
        ExtractionStrategy::Pattern(parser) => {
            let declarations = parser.parse_declarations(content);
            if declarations.is_empty() {
                Skeleton::excerpt(content, SkeletonStatus::Excerpt)
            } else {
                Skeleton {
                    text: pattern::render(&declarations),
                    status: SkeletonStatus::Extracted,
                }
            }
        }
        ExtractionStrategy::Unknown => Skeleton::excerpt(content, SkeletonStatus::Excerpt),
    };

    if skeleton.text.chars().count() > content.chars().count() {
        let status = match skeleton.status {
            SkeletonStatus::Extracted => SkeletonStatus::Excerpt,
            other => other,
        };
        return Skeleton::excerpt(content, status);
    }
    skeleton
}

/// Import references found in `content`.
pub fn extract_imports(content: &str, language: Language) -> Vec<ImportRef> {
    match ExtractionStrategy::for_language(language) {
        ExtractionStrategy::Parsed => python::imports(content),
        ExtractionStrategy::Pattern(parser) => parser.parse_imports(content),
        ExtractionStrategy::Unknown => Vec::new(),
    }
}

/// First [`EXCERPT_LINES`] lines, capped at [`EXCERPT_CHARS`] characters.
pub fn raw_excerpt(content: &str) -> String {
    let head = content
        .lines()
        .take(EXCERPT_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    match head.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => head[..cut].to_string(),
        None => head,
    }
}
