//! Anthropic Messages Provider
//!
//! Adapter for Anthropic's Messages API. Same contract as the
//! OpenAI-compatible adapter, different wire format: the instruction rides
//! in the top-level `system` field rather than a system message.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::openai::classify_transport_error;
use super::{GenerationParams, LlmProvider, ProviderSettings, StructuredPrompt};
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, ScribeError};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    max_input_chars: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(
        api_key: SecretString,
        model: String,
        api_base: String,
        settings: &ProviderSettings,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ScribeError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base,
            model,
            max_input_chars: settings.max_input_chars,
            client,
        })
    }

    fn build_request(&self, prompt: &StructuredPrompt, params: &GenerationParams)
    -> MessagesRequest {
        let mut messages = Vec::with_capacity(prompt.examples.len() * 2 + 1);
        for example in &prompt.examples {
            messages.push(Message {
                role: "user",
                content: example.post.clone(),
            });
            messages.push(Message {
                role: "assistant",
                content: example.response.clone(),
            });
        }
        messages.push(Message {
            role: "user",
            content: prompt.target_post.clone(),
        });

        MessagesRequest {
            model: self.model.clone(),
            system: prompt.instruction.clone(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn generate(
        &self,
        prompt: &StructuredPrompt,
        params: &GenerationParams,
    ) -> Result<String> {
        if prompt.approx_chars() > self.max_input_chars {
            return Err(LlmError::with_provider(
                ErrorCategory::PayloadTooLarge,
                format!(
                    "prompt is {} chars, provider limit is {}",
                    prompt.approx_chars(),
                    self.max_input_chars
                ),
                "anthropic",
            )
            .into());
        }

        let request = self.build_request(prompt, params);
        let url = format!("{}/messages", self.api_base);

        debug!(
            model = %self.model,
            temperature = params.temperature,
            "Sending Anthropic messages request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, "anthropic"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                ErrorClassifier::classify_http_status(status.as_u16(), &body, "anthropic").into(),
            );
        }

        let body: MessagesResponse = response.json().await.map_err(|e| {
            ScribeError::Llm(LlmError::with_provider(
                ErrorCategory::BadRequest,
                format!("failed to parse response: {}", e),
                "anthropic",
            ))
        })?;

        body.content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } if !text.is_empty() => Some(text),
                _ => None,
            })
            .ok_or_else(|| {
                ScribeError::Llm(LlmError::with_provider(
                    ErrorCategory::BadRequest,
                    "no text content in response",
                    "anthropic",
                ))
            })
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    system: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}
