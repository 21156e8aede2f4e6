//! OpenAI-Compatible Chat Provider
//!
//! Adapter for OpenAI's Chat Completions API and API-compatible backends
//! (DeepSeek uses the same wire format with a different base URL).
//!
//! Note: Retry and fallback logic are handled at the ProviderChain level.
//! This adapter performs single-shot execution only.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GenerationParams, LlmProvider, ProviderSettings, StructuredPrompt};
use crate::types::{ErrorCategory, ErrorClassifier, LlmError, Result, ScribeError};

/// Chat-completions provider with secure API key handling
pub struct OpenAiCompatProvider {
    name: &'static str,
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    max_input_chars: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.name)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiCompatProvider {
    pub fn new(
        name: &'static str,
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
            name,
            api_key,
            api_base,
            model,
            max_input_chars: settings.max_input_chars,
            client,
        })
    }

    /// Frame the structured prompt as chat messages: instruction becomes the
    /// system message, each exemplar a user/assistant turn, the target post
    /// the final user message.
    fn build_request(&self, prompt: &StructuredPrompt, params: &GenerationParams) -> ChatRequest {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: prompt.instruction.clone(),
        }];
        for example in &prompt.examples {
            messages.push(ChatMessage {
                role: "user",
                content: example.post.clone(),
            });
            messages.push(ChatMessage {
                role: "assistant",
                content: example.response.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.target_post.clone(),
        });

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
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
                self.name,
            )
            .into());
        }

        let request = self.build_request(prompt, params);
        let url = format!("{}/chat/completions", self.api_base);

        debug!(
            provider = self.name,
            model = %self.model,
            temperature = params.temperature,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, self.name))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                ErrorClassifier::classify_http_status(status.as_u16(), &body, self.name).into(),
            );
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            ScribeError::Llm(LlmError::with_provider(
                ErrorCategory::BadRequest,
                format!("failed to parse response: {}", e),
                self.name,
            ))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                ScribeError::Llm(LlmError::with_provider(
                    ErrorCategory::BadRequest,
                    "no content in response",
                    self.name,
                ))
            })
    }

    fn name(&self) -> &str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Map reqwest transport failures onto retry categories: timeouts and
/// connection errors are transient, everything else is classified by
/// message.
pub(super) fn classify_transport_error(err: &reqwest::Error, provider: &str) -> ScribeError {
    let category = if err.is_timeout() {
        ErrorCategory::Network
    } else if err.is_connect() {
        ErrorCategory::Network
    } else {
        return ErrorClassifier::classify(&err.to_string(), provider).into();
    };
    LlmError::with_provider(category, err.to_string(), provider)
        .retry_after(Duration::from_secs(5))
        .into()
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::Example;
    use crate::llm::PromptBuilder;

    fn provider(max_input_chars: usize) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(
            "openai",
            SecretString::from("sk-test"),
            "gpt-4o".to_string(),
            "https://api.openai.com/v1".to_string(),
            &ProviderSettings {
                max_input_chars,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_request_framing() {
        let p = provider(400_000);
        let prompt = PromptBuilder::new("week prompt").build(
            &[Example {
                post: "student post".into(),
                response: "instructor reply".into(),
            }],
            "target",
        );
        let request = p.build_request(&prompt, &GenerationParams::default());

        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[1].content, "student post");
        assert_eq!(request.messages[2].role, "assistant");
        assert_eq!(request.messages[3].content, "target");
    }

    #[tokio::test]
    async fn test_oversized_prompt_fails_before_network() {
        let p = provider(10);
        let prompt = PromptBuilder::new("a long instruction").build(&[], "target post text");
        let err = p
            .generate(&prompt, &GenerationParams::default())
            .await
            .unwrap_err();
        match err {
            ScribeError::Llm(e) => assert_eq!(e.category, ErrorCategory::PayloadTooLarge),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", provider(100));
        assert!(!rendered.contains("sk-test"));
    }
}
