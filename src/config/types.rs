//! Configuration Types
//!
//! All runtime tuning with documented defaults. Components receive an
//! explicitly constructed, immutable `Config` at construction; nothing reads
//! ambient global state, so tests can vary parameters freely.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{chain, course, generation};
use crate::llm::{ChainConfig, ProviderKind, ProviderSettings, ValidatorConfig};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Response generation settings
    pub generation: GenerationConfig,

    /// Provider chain retry/fallback tuning
    pub chain: ChainTuning,

    /// Per-provider overrides
    pub providers: ProvidersConfig,

    /// Configuration document locations
    pub documents: DocumentsConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ScribeError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(crate::types::ScribeError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            )));
        }

        if self.generation.max_words == 0 {
            return Err(crate::types::ScribeError::Config(
                "generation.max_words must be greater than 0".to_string(),
            ));
        }

        if self.generation.max_attempts == 0 {
            return Err(crate::types::ScribeError::Config(
                "generation.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.chain.max_retries == 0 {
            return Err(crate::types::ScribeError::Config(
                "chain.max_retries must be greater than 0".to_string(),
            ));
        }

        if self.chain.timeout_secs == 0 {
            return Err(crate::types::ScribeError::Config(
                "chain.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Chain configuration derived from tuning values
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig {
            max_total_attempts: self.chain.max_total_attempts,
            base_delay: Duration::from_millis(self.chain.base_delay_ms),
            max_delay: Duration::from_secs(self.chain.max_delay_secs),
            backoff_factor: self.chain.backoff_factor,
        }
    }

    /// Transport settings for one provider, overrides applied
    pub fn provider_settings(&self, kind: ProviderKind) -> ProviderSettings {
        let overrides = match kind {
            ProviderKind::Openai => &self.providers.openai,
            ProviderKind::Anthropic => &self.providers.anthropic,
            ProviderKind::Deepseek => &self.providers.deepseek,
        };
        ProviderSettings {
            model: overrides.model.clone(),
            api_base: overrides.api_base.clone(),
            timeout_secs: self.chain.timeout_secs,
            max_input_chars: overrides.max_input_chars,
        }
    }

    /// Validator configuration derived from generation settings
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            max_words: self.generation.max_words,
            ..Default::default()
        }
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature (0.0 = deterministic, higher = creative)
    pub temperature: f32,

    /// Maximum accepted response word count
    pub max_words: usize,

    /// Few-shot example count included in the prompt
    pub few_shot_k: usize,

    /// Maximum tokens requested from the provider
    pub max_output_tokens: usize,

    /// Overall attempt ceiling across generate + validate cycles
    pub max_attempts: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: generation::TEMPERATURE,
            max_words: generation::MAX_RESPONSE_WORDS,
            few_shot_k: generation::FEW_SHOT_K,
            max_output_tokens: generation::MAX_OUTPUT_TOKENS,
            max_attempts: generation::MAX_GENERATION_ATTEMPTS,
        }
    }
}

// =============================================================================
// Chain Tuning
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainTuning {
    /// Maximum total attempts across all providers in one request
    pub max_total_attempts: usize,

    /// Maximum attempts per provider (first try + retries)
    pub max_retries: u8,

    /// Base delay for exponential backoff (milliseconds)
    pub base_delay_ms: u64,

    /// Maximum delay between retries (seconds)
    pub max_delay_secs: u64,

    /// Backoff multiplier
    pub backoff_factor: f32,

    /// Per-attempt request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ChainTuning {
    fn default() -> Self {
        Self {
            max_total_attempts: chain::MAX_TOTAL_ATTEMPTS,
            max_retries: chain::DEFAULT_MAX_RETRIES,
            base_delay_ms: chain::BASE_DELAY_MS,
            max_delay_secs: chain::MAX_DELAY_SECS,
            backoff_factor: chain::BACKOFF_FACTOR,
            timeout_secs: chain::DEFAULT_TIMEOUT_SECS,
        }
    }
}

// =============================================================================
// Provider Overrides
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderOverrides,
    pub anthropic: ProviderOverrides,
    pub deepseek: ProviderOverrides,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOverrides {
    /// Model name (provider default when absent)
    pub model: Option<String>,

    /// API base URL override
    pub api_base: Option<String>,

    /// Input size ceiling in characters
    pub max_input_chars: usize,
}

impl Default for ProviderOverrides {
    fn default() -> Self {
        Self {
            model: None,
            api_base: None,
            max_input_chars: 400_000,
        }
    }
}

// =============================================================================
// Document Locations
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Path to the course document
    pub courses_file: PathBuf,

    /// Path to the announcement document
    pub announcements_file: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            courses_file: PathBuf::from(course::COURSES_FILE),
            announcements_file: PathBuf::from(course::ANNOUNCEMENTS_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let mut config = Config::default();
        config.generation.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_retries() {
        let mut config = Config::default();
        config.chain.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_provider_settings_overrides() {
        let mut config = Config::default();
        config.providers.deepseek.model = Some("deepseek-reasoner".to_string());
        let settings = config.provider_settings(ProviderKind::Deepseek);
        assert_eq!(settings.model.as_deref(), Some("deepseek-reasoner"));
        assert_eq!(settings.timeout_secs, config.chain.timeout_secs);

        let openai = config.provider_settings(ProviderKind::Openai);
        assert!(openai.model.is_none());
    }
}
