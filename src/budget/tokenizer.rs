use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

// The BPE tables are embedded in tiktoken-rs, so loading cannot fail at runtime
static CL100K: Lazy<CoreBPE> =
    Lazy::new(|| tiktoken_rs::cl100k_base().expect("embedded cl100k_base tables"));
static O200K: Lazy<CoreBPE> =
    Lazy::new(|| tiktoken_rs::o200k_base().expect("embedded o200k_base tables"));

/// Counts tokens exactly as the target model's tokenizer would.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Tokenizer family of the target model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// GPT-4 / GPT-3.5 family
    #[default]
    Cl100k,
    /// GPT-4o / o-series family
    O200k,
}

impl TokenizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenizerKind::Cl100k => "cl100k_base",
            TokenizerKind::O200k => "o200k_base",
        }
    }
}

/// tiktoken byte-pair-encoding counter
pub struct BpeCounter {
    kind: TokenizerKind,
    bpe: &'static CoreBPE,
}

impl BpeCounter {
    pub fn new(kind: TokenizerKind) -> Self {
        let bpe: &'static CoreBPE = match kind {
            TokenizerKind::Cl100k => &CL100K,
            TokenizerKind::O200k => &O200K,
        };
        Self { kind, bpe }
    }

    pub fn kind(&self) -> TokenizerKind {
        self.kind
    }
}

impl Default for BpeCounter {
    fn default() -> Self {
        Self::new(TokenizerKind::default())
    }
}

impl TokenCounter for BpeCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(BpeCounter::default().count(""), 0);
    }

    #[test]
    fn test_counts_are_stable() {
        let counter = BpeCounter::new(TokenizerKind::Cl100k);
        let text = "fn main() { println!(\"hello\"); }";
        let first = counter.count(text);
        assert!(first > 0);
        assert_eq!(counter.count(text), first);
    }

    #[test]
    fn test_hello_world_cl100k() {
        // "hello world" is two tokens in cl100k_base
        assert_eq!(BpeCounter::new(TokenizerKind::Cl100k).count("hello world"), 2);
    }

    #[test]
    fn test_o200k_available() {
        assert!(BpeCounter::new(TokenizerKind::O200k).count("hello world") > 0);
    }
}
