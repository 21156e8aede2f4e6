//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for discussion-response generation.
//! Providers form a closed set; adding one means adding an adapter and a
//! `ProviderKind` variant, the orchestration logic never changes.
//!
//! ## Modules
//!
//! - `chain`: Fallback provider chain with cascading attempts
//! - `prompt`: Provider-neutral structured prompt construction
//! - `validate`: Response acceptance rules

pub mod chain;
pub mod prompt;
pub mod validate;

mod anthropic;
mod openai;

pub use anthropic::AnthropicProvider;
pub use chain::{ChainConfig, ChainStats, ChainedProvider, ProviderChain};
pub use openai::OpenAiCompatProvider;
pub use prompt::{PromptBuilder, StructuredPrompt};
pub use validate::{RejectionReason, ResponseValidator, ValidatorConfig};

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::models;
use crate::types::{Result, ScribeError};

// =============================================================================
// Provider Enumeration
// =============================================================================

/// The closed set of supported LLM backends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Openai,
    Anthropic,
    Deepseek,
}

impl ProviderKind {
    /// Auto-detect priority order: first provider with a credential wins.
    pub const DETECTION_ORDER: [ProviderKind; 3] =
        [Self::Openai, Self::Anthropic, Self::Deepseek];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Anthropic => "anthropic",
            Self::Deepseek => "deepseek",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Openai => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Deepseek => "DEEPSEEK_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// API keys sourced from the process environment.
///
/// A missing key excludes that provider from orchestration; it is only an
/// error when every provider is absent.
pub struct Credentials {
    keys: Vec<(ProviderKind, SecretString)>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "present",
                &self.keys.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Credentials {
    /// Read all provider keys from the environment. Blank values count as
    /// absent.
    pub fn from_env() -> Self {
        let keys = ProviderKind::DETECTION_ORDER
            .into_iter()
            .filter_map(|kind| {
                std::env::var(kind.env_var())
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (kind, SecretString::from(v)))
            })
            .collect();
        Self { keys }
    }

    /// Build from explicit key material (used by tests).
    pub fn from_pairs(pairs: Vec<(ProviderKind, SecretString)>) -> Self {
        Self { keys: pairs }
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&SecretString> {
        self.keys.iter().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }

    /// Providers with a credential present, in detection order.
    pub fn available(&self) -> Vec<ProviderKind> {
        ProviderKind::DETECTION_ORDER
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .collect()
    }

    /// Resolve the provider order for one request.
    ///
    /// Explicit selection takes precedence and requires a credential for
    /// that provider. Otherwise every credentialed provider participates in
    /// detection order. No credentials at all is a hard configuration error
    /// surfaced before any network call.
    pub fn provider_order(&self, explicit: Option<ProviderKind>) -> Result<Vec<ProviderKind>> {
        if let Some(kind) = explicit {
            if self.get(kind).is_none() {
                return Err(ScribeError::Config(format!(
                    "provider '{}' selected but {} is not set",
                    kind,
                    kind.env_var()
                )));
            }
            return Ok(vec![kind]);
        }

        let available = self.available();
        if available.is_empty() {
            return Err(ScribeError::Config(
                "no LLM API keys found; set at least one of OPENAI_API_KEY, \
                 ANTHROPIC_API_KEY, or DEEPSEEK_API_KEY"
                    .to_string(),
            ));
        }
        if available.len() > 1 {
            info!(
                providers = ?available.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
                using = available[0].as_str(),
                "Multiple LLM providers available, preferring first"
            );
        }
        Ok(available)
    }
}

// =============================================================================
// Generation Parameters
// =============================================================================

/// Per-request generation parameters, identical across every provider in a
/// fallback chain.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens the provider may generate
    pub max_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: crate::constants::generation::TEMPERATURE,
            max_tokens: crate::constants::generation::MAX_OUTPUT_TOKENS,
        }
    }
}

// =============================================================================
// Provider Settings
// =============================================================================

/// Transport settings for one provider adapter.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Model name (provider default when None)
    pub model: Option<String>,
    /// API base URL override
    pub api_base: Option<String>,
    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,
    /// Input size ceiling in characters; larger prompts fail with
    /// `PayloadTooLarge` before any network call
    pub max_input_chars: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: None,
            api_base: None,
            timeout_secs: crate::constants::chain::DEFAULT_TIMEOUT_SECS,
            max_input_chars: 400_000,
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// Capability contract every backend satisfies.
///
/// Adapters own provider-specific framing of the structured prompt and the
/// classification of transport failures; retry and fallback logic live in
/// [`ProviderChain`].
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate raw response text for a structured prompt.
    async fn generate(&self, prompt: &StructuredPrompt, params: &GenerationParams)
    -> Result<String>;

    /// Provider name for logging and diagnostics
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Shared provider handle used by the chain.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

/// Create a provider adapter for `kind`.
pub fn create_provider(
    kind: ProviderKind,
    api_key: SecretString,
    settings: &ProviderSettings,
) -> Result<SharedProvider> {
    let provider: SharedProvider = match kind {
        ProviderKind::Openai => Arc::new(OpenAiCompatProvider::new(
            "openai",
            api_key,
            settings
                .model
                .clone()
                .unwrap_or_else(|| models::OPENAI_MODEL.to_string()),
            settings
                .api_base
                .clone()
                .unwrap_or_else(|| models::OPENAI_API_BASE.to_string()),
            settings,
        )?),
        ProviderKind::Deepseek => Arc::new(OpenAiCompatProvider::new(
            "deepseek",
            api_key,
            settings
                .model
                .clone()
                .unwrap_or_else(|| models::DEEPSEEK_MODEL.to_string()),
            settings
                .api_base
                .clone()
                .unwrap_or_else(|| models::DEEPSEEK_API_BASE.to_string()),
            settings,
        )?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
            api_key,
            settings
                .model
                .clone()
                .unwrap_or_else(|| models::ANTHROPIC_MODEL.to_string()),
            settings
                .api_base
                .clone()
                .unwrap_or_else(|| models::ANTHROPIC_API_BASE.to_string()),
            settings,
        )?),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(kinds: &[ProviderKind]) -> Credentials {
        Credentials::from_pairs(
            kinds
                .iter()
                .map(|k| (*k, SecretString::from("sk-test")))
                .collect(),
        )
    }

    #[test]
    fn test_detection_order() {
        let c = creds(&[ProviderKind::Deepseek, ProviderKind::Anthropic]);
        assert_eq!(
            c.available(),
            vec![ProviderKind::Anthropic, ProviderKind::Deepseek]
        );
        assert_eq!(
            c.provider_order(None).unwrap(),
            vec![ProviderKind::Anthropic, ProviderKind::Deepseek]
        );
    }

    #[test]
    fn test_explicit_selection_takes_precedence() {
        let c = creds(&[ProviderKind::Openai, ProviderKind::Deepseek]);
        assert_eq!(
            c.provider_order(Some(ProviderKind::Deepseek)).unwrap(),
            vec![ProviderKind::Deepseek]
        );
    }

    #[test]
    fn test_explicit_selection_requires_credential() {
        let c = creds(&[ProviderKind::Openai]);
        assert!(c.provider_order(Some(ProviderKind::Anthropic)).is_err());
    }

    #[test]
    fn test_no_credentials_is_hard_error() {
        let c = creds(&[]);
        let err = c.provider_order(None).unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let c = creds(&[ProviderKind::Openai]);
        let rendered = format!("{:?}", c);
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("openai"));
    }
}
