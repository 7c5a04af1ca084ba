use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::budget::TokenizerKind;
use crate::error::{Error, Result};

const LOCAL_CONFIG_FILE: &str = "repo-digest.toml";
const CONFIG_DIR_NAME: &str = "repo-digest";

/// Complete run configuration, passed explicitly to [`crate::Summarizer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub budget: BudgetConfig,
    pub github: GitHubConfig,
    pub llm: LlmConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub total_tokens: usize,
    pub slots: SlotPercentages,
    pub max_file_size_kb: u64,
    pub max_files: usize,
    pub tokenizer: TokenizerKind,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total_tokens: 32_000,
            slots: SlotPercentages::default(),
            max_file_size_kb: 200,
            max_files: 30,
            tokenizer: TokenizerKind::Cl100k,
        }
    }
}

impl BudgetConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(1024)
    }
}

/// Share of the total budget per slot, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPercentages {
    pub readme: u32,
    pub config: u32,
    pub tree: u32,
    pub skeletons: u32,
    pub reserve: u32,
}

impl Default for SlotPercentages {
    fn default() -> Self {
        Self {
            readme: 30,
            config: 15,
            tree: 10,
            skeletons: 40,
            reserve: 5,
        }
    }
}

impl SlotPercentages {
    /// Percentages in slot fill order
    pub fn in_order(&self) -> [u32; 5] {
        [self.readme, self.config, self.tree, self.skeletons, self.reserve]
    }

    pub fn sum(&self) -> u32 {
        self.in_order().iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub raw_url: String,
    pub token: Option<String>,
    pub concurrency: usize,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            raw_url: "https://raw.githubusercontent.com".to_string(),
            token: None,
            concurrency: 8,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Multi-pass when source tokens exceed this multiple of the Skeletons base
    pub multi_pass_factor: f64,
    /// Files summarized individually in pass 1
    pub multi_pass_top_files: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            multi_pass_factor: 2.0,
            multi_pass_top_files: 8,
        }
    }
}

impl Config {
    /// Parse a TOML document; missing sections and keys take defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::InvalidInput(format!("invalid config: {}", e)))
    }

    /// Read config from `explicit`, else the first existing default location,
    /// else defaults. Environment overrides are applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::read_file(path)?,
            None => match Self::default_locations().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::read_file(&path)?,
                None => Config::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }
        locations
    }

    /// Apply environment overrides through `lookup`, so tests can inject values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = non_empty("OPENAI_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(raw) = non_empty("REPO_DIGEST_MAX_TOKENS") {
            self.budget.total_tokens = raw.trim().parse().map_err(|_| {
                Error::InvalidInput(format!("REPO_DIGEST_MAX_TOKENS is not a number: {}", raw))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.budget.total_tokens == 0 {
            return Err(Error::InvalidInput(
                "total token budget must be greater than zero".to_string(),
            ));
        }
        let sum = self.budget.slots.sum();
        if sum > 100 {
            return Err(Error::InvalidInput(format!(
                "slot percentages sum to {}%, must not exceed 100%",
                sum
            )));
        }
        if self.budget.max_files == 0 {
            return Err(Error::InvalidInput(
                "max files to fetch must be at least 1".to_string(),
            ));
        }
        let factor = self.orchestrator.multi_pass_factor;
        if factor.is_nan() || factor <= 0.0 {
            return Err(Error::InvalidInput(
                "multi-pass factor must be positive".to_string(),
            ));
        }
        if self.orchestrator.multi_pass_top_files == 0 {
            return Err(Error::InvalidInput(
                "multi-pass top files must be at least 1".to_string(),
            ));
        }
        if self.github.concurrency == 0 {
            return Err(Error::InvalidInput(
                "fetch concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
