use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{LlmGateway, Prompt, ResponseMode};
use crate::config::LlmConfig;
use crate::error::{Error, Result};

/// Chat-completions endpoint of OpenAI or any compatible server.
pub struct OpenAiGateway {
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiGateway {
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Gateway(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            client,
        })
    }

    fn request<'a>(&'a self, prompt: &'a Prompt, mode: ResponseMode) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            response_format: match mode {
                ResponseMode::Json => Some(ResponseFormat { kind: "json_object" }),
                ResponseMode::Text => None,
            },
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(&self, prompt: &Prompt, mode: ResponseMode) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt, mode))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Gateway(format!("request to {} timed out", self.endpoint))
                } else if e.is_connect() {
                    Error::Gateway(format!("cannot reach {}", self.endpoint))
                } else {
                    Error::Gateway(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Gateway(format!("unreadable completion: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::Gateway("model returned an empty response".to_string()))?;

        debug!("Completion from {}: {} chars", self.model, content.len());
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn status_error(status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => {
            Error::Gateway("invalid API key; set a valid OPENAI_API_KEY".to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => {
            Error::Gateway(format!("rate limit or quota exceeded: {}", excerpt(body)))
        }
        _ => Error::Gateway(format!("HTTP {}: {}", status.as_u16(), excerpt(body))),
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(300) {
        Some((cut, _)) => &body[..cut],
        None => body,
    }
}
