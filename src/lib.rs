//! Deterministic, secret-free repository context for language models.

pub mod analyze;
pub mod assemble;
pub mod budget;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod scan;
pub mod security;
pub mod summarize;
pub mod types;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use summarize::{Summarizer, SummaryOutcome};
pub use types::{RepoIdentity, SummaryResult};
