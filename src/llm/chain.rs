//! Fallback Provider Chain
//!
//! Cascading provider attempts with retry and fallback. Providers are tried
//! strictly sequentially; concurrent speculative calls would duplicate paid
//! API spend for no correctness benefit, since only one result is needed.
//!
//! ## Strategy
//!
//! 1. Try providers in order (explicit selection or detection order)
//! 2. On failure, classify the error
//! 3. Transient failures retry the same provider with exponential backoff
//!    and jitter, up to that provider's retry budget
//! 4. Permanent failures (auth, malformed request, payload too large)
//!    advance to the next provider immediately, consuming no retry budget
//! 5. When every provider is exhausted, fail with `AllProvidersExhausted`
//!    carrying the per-provider reasons

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::constants::chain as chain_constants;

use super::{GenerationParams, LlmProvider, SharedProvider, StructuredPrompt};
use crate::types::{ErrorClassifier, LlmError, ProviderFailure, Result, ScribeError};

/// Provider with chain routing metadata
#[derive(Clone)]
pub struct ChainedProvider {
    /// Provider instance
    pub provider: SharedProvider,
    /// Maximum attempts on this provider (first try + retries)
    pub max_retries: u8,
}

impl ChainedProvider {
    pub fn new(provider: SharedProvider) -> Self {
        Self {
            provider,
            max_retries: chain_constants::DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }
}

/// Configuration for the provider chain
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Maximum total attempts across all providers
    pub max_total_attempts: usize,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_factor: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_total_attempts: chain_constants::MAX_TOTAL_ATTEMPTS,
            base_delay: Duration::from_millis(chain_constants::BASE_DELAY_MS),
            max_delay: Duration::from_secs(chain_constants::MAX_DELAY_SECS),
            backoff_factor: chain_constants::BACKOFF_FACTOR,
        }
    }
}

/// Execution statistics for one chain run
#[derive(Debug, Default)]
pub struct ChainStats {
    /// Attempts across all providers
    pub total_attempts: usize,
    /// Provider that produced the accepted result
    pub successful_provider: Option<String>,
    /// Per-provider failure records for providers that were exhausted
    pub failures: Vec<ProviderFailure>,
}

/// Fallback provider chain with cascading attempts.
///
/// The prompt and parameters are identical across providers; only the
/// transport adapter differs.
pub struct ProviderChain {
    providers: Vec<ChainedProvider>,
    config: ChainConfig,
}

impl ProviderChain {
    /// Create an empty chain
    pub fn new(config: ChainConfig) -> Self {
        Self {
            providers: Vec::new(),
            config,
        }
    }

    /// Append a provider to the fallback order
    pub fn add_provider(mut self, provider: ChainedProvider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Execute the request against the fallback chain.
    #[instrument(skip(self, prompt, params), fields(providers = self.providers.len()))]
    pub async fn execute(
        &self,
        prompt: &StructuredPrompt,
        params: &GenerationParams,
    ) -> Result<(String, ChainStats)> {
        let mut stats = ChainStats::default();

        if self.providers.is_empty() {
            return Err(ScribeError::Config(
                "no providers configured in chain".to_string(),
            ));
        }

        'providers: for entry in &self.providers {
            let provider = &entry.provider;
            let provider_name = provider.name().to_string();
            let mut current_delay = self.config.base_delay;
            let mut provider_attempts = 0usize;
            let mut last_error: Option<LlmError> = None;

            for attempt in 1..=entry.max_retries {
                if stats.total_attempts >= self.config.max_total_attempts {
                    warn!(
                        max_attempts = self.config.max_total_attempts,
                        "Total attempt ceiling reached"
                    );
                    if let Some(err) = last_error.take() {
                        stats.failures.push(ProviderFailure {
                            provider: provider_name,
                            attempts: provider_attempts,
                            error: err,
                        });
                    }
                    break 'providers;
                }

                stats.total_attempts += 1;
                provider_attempts += 1;

                debug!(
                    provider = %provider_name,
                    attempt,
                    max_retries = entry.max_retries,
                    total_attempt = stats.total_attempts,
                    "Chain attempt"
                );

                match provider.generate(prompt, params).await {
                    Ok(text) => {
                        stats.successful_provider = Some(provider_name.clone());
                        info!(
                            provider = %provider_name,
                            attempts = stats.total_attempts,
                            "Chain succeeded"
                        );
                        return Ok((text, stats));
                    }
                    Err(err) => {
                        let classified = classify(err, &provider_name);
                        warn!(
                            provider = %provider_name,
                            attempt,
                            category = %classified.category,
                            error = %classified.message,
                            "Provider failed"
                        );

                        let transient = classified.is_transient();
                        let retry_hint = classified.retry_after;
                        last_error = Some(classified);

                        if !transient {
                            // Auth, malformed request, payload too large:
                            // abort this provider, advance to the next.
                            break;
                        }

                        if attempt < entry.max_retries {
                            let wait = retry_hint
                                .unwrap_or_else(|| current_delay + random_jitter(current_delay));
                            debug!(wait_ms = wait.as_millis(), "Retrying after backoff");
                            sleep(wait).await;
                            current_delay = next_backoff(
                                current_delay,
                                self.config.backoff_factor,
                                self.config.max_delay,
                            );
                        }
                    }
                }
            }

            if let Some(err) = last_error {
                stats.failures.push(ProviderFailure {
                    provider: provider_name.clone(),
                    attempts: provider_attempts,
                    error: err,
                });
                info!(provider = %provider_name, "Provider exhausted, trying next");
            }
        }

        Err(ScribeError::AllProvidersExhausted {
            failures: std::mem::take(&mut stats.failures),
        })
    }
}

#[async_trait]
impl LlmProvider for ProviderChain {
    async fn generate(
        &self,
        prompt: &StructuredPrompt,
        params: &GenerationParams,
    ) -> Result<String> {
        let (text, _stats) = self.execute(prompt, params).await?;
        Ok(text)
    }

    fn name(&self) -> &str {
        "provider-chain"
    }

    fn model(&self) -> &str {
        self.providers
            .first()
            .map(|p| p.provider.model())
            .unwrap_or("unknown")
    }
}

/// Normalize any error surfaced by an adapter into a classified `LlmError`.
fn classify(err: ScribeError, provider: &str) -> LlmError {
    match err {
        ScribeError::Llm(e) => e,
        ScribeError::LlmApi(msg) => ErrorClassifier::classify(&msg, provider),
        other => ErrorClassifier::classify(&other.to_string(), provider),
    }
}

/// Random jitter up to a quarter of the base delay
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    let jitter_ms = rand::rng().random_range(0..max_jitter_ms);
    Duration::from_millis(jitter_ms)
}

/// Exponential backoff with cap
fn next_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    let next = Duration::from_secs_f32(current.as_secs_f32() * factor);
    std::cmp::min(next, max)
}
