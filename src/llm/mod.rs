mod openai;

pub use openai::OpenAiGateway;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

/// Whether the model is asked for a JSON object or free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Json,
    Text,
}

/// System and user messages for one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Completion text for `prompt`. Any failure is [`Error::Gateway`].
    async fn complete(&self, prompt: &Prompt, mode: ResponseMode) -> Result<String>;

    fn model(&self) -> &str;
}

pub fn create_gateway(config: &LlmConfig) -> Result<Arc<dyn LlmGateway>> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            Error::InvalidInput(
                "no API key configured; set OPENAI_API_KEY or llm.api_key".to_string(),
            )
        })?;
    Ok(Arc::new(OpenAiGateway::new(config, api_key)?))
}
