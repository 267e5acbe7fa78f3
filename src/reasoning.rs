//! Reasoning backend
//!
//! Narrow text-in/text-out interface over a generative model. Evaluators hold an
//! `Arc<dyn ReasoningBackend>`, so tests and alternative providers can be injected
//! without touching the decision logic.

use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unified interface for the reasoning service
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Call the model with system + user prompts, return the raw text reply
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError>;

    /// Model name for logging
    fn model_name(&self) -> &str;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

/// Model settings, passed explicitly to each backend at construction.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ModelSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: Duration::from_secs(config.reasoning_timeout_secs),
        }
    }
}

/// Client for OpenAI-compatible chat-completions endpoints.
#[derive(Clone)]
pub struct OpenAiReasoningClient {
    client: Client,
    base_url: String,
    api_key: String,
    settings: ModelSettings,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl OpenAiReasoningClient {
    pub fn new(base_url: &str, api_key: String, settings: ModelSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create reasoning client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            settings,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            &config.openai_base_url,
            config.openai_api_key.clone(),
            ModelSettings::from_config(config),
        )
    }
}

#[async_trait]
impl ReasoningBackend for OpenAiReasoningClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AppError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        tracing::debug!("Calling reasoning backend with model: {}", self.settings.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(AppError::from)
            .context("Reasoning request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Reasoning backend returned {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            AppError::ReasoningError(format!("Failed to parse reasoning response: {}", e))
        })?;

        if let Some(usage) = &body.usage {
            tracing::debug!("Reasoning call used {} tokens", usage.total_tokens);
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::ReasoningError("Empty reply from reasoning backend".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}
