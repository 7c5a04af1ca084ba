use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

/// Summarize a source repository under a fixed token budget
#[derive(Parser, Debug)]
#[command(name = "repo-digest")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// GitHub URL (https://github.com/<owner>/<repo>) or local directory
    pub repository: String,

    /// Configuration file (default: ./repo-digest.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Total context budget in tokens
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Maximum number of files to fetch
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Skip files larger than this many kilobytes
    #[arg(long)]
    pub max_file_size_kb: Option<u64>,

    /// Model name for the chat-completions endpoint
    #[arg(long)]
    pub model: Option<String>,

    /// Build and print the context without calling the model
    #[arg(long)]
    pub context_only: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl Args {
    /// Flags take precedence over file and environment settings.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(total) = self.max_tokens {
            config.budget.total_tokens = total;
        }
        if let Some(max) = self.max_files {
            config.budget.max_files = max;
        }
        if let Some(kb) = self.max_file_size_kb {
            config.budget.max_file_size_kb = kb;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "repo-digest",
            "https://github.com/octo/demo",
            "--max-tokens",
            "4000",
            "--model",
            "gpt-4o",
            "--format",
            "json",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.budget.total_tokens, 4000);
        assert_eq!(config.budget.max_files, 30);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.context_only);
    }
}
