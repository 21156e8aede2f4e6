//! Response Generation Orchestration
//!
//! Ties the pipeline together for one discussion response: few-shot
//! selection, prompt construction, provider-chain execution, and validation.
//! Validation rejections trigger regeneration, bounded by an overall attempt
//! ceiling across the whole orchestration so the loop always terminates.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::config::Config;
use crate::course::WeekSpec;
use crate::fewshot;
use crate::llm::{
    ChainedProvider, Credentials, GenerationParams, PromptBuilder, ProviderChain, ProviderKind,
    ResponseValidator, create_provider,
};
use crate::types::{Result, ScribeError};

/// One generation request, fully resolved.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The student post to respond to
    pub target_post: String,
}

/// How the accepted text cleared validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Accepted on the first validation pass
    Accepted,
    /// Accepted after one or more rejected generations
    AcceptedAfterRetry { rejections: usize },
}

/// Outcome of a successful generation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Validated response text
    pub text: String,
    /// Provider that produced it
    pub provider: String,
    /// Provider attempts consumed across all generation cycles
    pub attempts: usize,
    /// Validation outcome
    pub validation: ValidationStatus,
}

/// Discussion-response generator.
///
/// Holds the provider chain and validator for one invocation; no state is
/// shared across invocations.
pub struct ResponseGenerator {
    chain: ProviderChain,
    validator: ResponseValidator,
    params: GenerationParams,
    few_shot_k: usize,
    max_words: usize,
    max_attempts: usize,
}

impl ResponseGenerator {
    pub fn new(
        chain: ProviderChain,
        validator: ResponseValidator,
        params: GenerationParams,
        few_shot_k: usize,
        max_words: usize,
        max_attempts: usize,
    ) -> Self {
        Self {
            chain,
            validator,
            params,
            few_shot_k,
            max_words,
            max_attempts,
        }
    }

    /// Build a generator from configuration and detected credentials.
    ///
    /// Providers without a credential are excluded from the chain entirely;
    /// they are never attempted and never counted as failures.
    pub fn from_config(
        config: &Config,
        credentials: &Credentials,
        explicit: Option<ProviderKind>,
    ) -> Result<Self> {
        let order = credentials.provider_order(explicit)?;

        let mut chain = ProviderChain::new(config.chain_config());
        for kind in &order {
            let key = credentials.get(*kind).cloned().ok_or_else(|| {
                ScribeError::Config(format!("credential for '{}' vanished mid-setup", kind))
            })?;
            let provider = create_provider(*kind, key, &config.provider_settings(*kind))?;
            chain = chain
                .add_provider(ChainedProvider::new(provider).with_max_retries(config.chain.max_retries));
        }

        info!(
            providers = ?order.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            "Provider chain assembled"
        );

        Ok(Self::new(
            chain,
            ResponseValidator::new(config.validator_config()),
            GenerationParams {
                temperature: config.generation.temperature,
                max_tokens: config.generation.max_output_tokens,
            },
            config.generation.few_shot_k,
            config.generation.max_words,
            config.generation.max_attempts,
        ))
    }

    /// Generate a validated response for a student post in the given week.
    pub async fn respond(&self, week: &WeekSpec, request: &GenerationRequest)
    -> Result<GenerationResult> {
        self.respond_seeded(week, request, StdRng::from_os_rng()).await
    }

    /// Like [`respond`](Self::respond) but with a caller-supplied RNG, so
    /// phrase injection is reproducible under test.
    pub async fn respond_seeded(
        &self,
        week: &WeekSpec,
        request: &GenerationRequest,
        mut rng: StdRng,
    ) -> Result<GenerationResult> {
        let examples = week.examples();
        let few_shots = fewshot::select(&examples, self.few_shot_k);
        let builder = PromptBuilder::new(week.discussion_prompt.as_str()).max_words(self.max_words);

        let mut total_attempts = 0usize;
        let mut last_rejection = None;

        for cycle in 1..=self.max_attempts {
            let prompt = builder
                .clone()
                .randomize(&mut rng)
                .build(few_shots, &request.target_post);

            let (raw, stats) = self.chain.execute(&prompt, &self.params).await?;
            total_attempts += stats.total_attempts;
            let provider = stats
                .successful_provider
                .unwrap_or_else(|| "unknown".to_string());

            match self.validator.validate(&raw) {
                Ok(text) => {
                    info!(provider = %provider, attempts = total_attempts, "Response accepted");
                    return Ok(GenerationResult {
                        text: text.to_string(),
                        provider,
                        attempts: total_attempts,
                        validation: if cycle == 1 {
                            ValidationStatus::Accepted
                        } else {
                            ValidationStatus::AcceptedAfterRetry {
                                rejections: cycle - 1,
                            }
                        },
                    });
                }
                Err(reason) => {
                    warn!(cycle, %reason, "Response rejected, regenerating");
                    last_rejection = Some(reason);
                }
            }
        }

        Err(ScribeError::ResponseRejected {
            reason: last_rejection
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown rejection".to_string()),
            attempts: total_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::Example;
    use crate::llm::{ChainConfig, LlmProvider, StructuredPrompt, ValidatorConfig};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock that replays a scripted list of responses.
    struct ScriptedProvider {
        responses: Vec<String>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: responses.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(
            &self,
            _prompt: &StructuredPrompt,
            _params: &GenerationParams,
        ) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .responses
                .get(call.min(self.responses.len() - 1))
                .cloned()
                .unwrap())
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }

    fn week() -> WeekSpec {
        WeekSpec {
            topic_id: Some("987".to_string()),
            discussion_prompt: "Discuss the OSI model.".to_string(),
            discussion_data: vec![
                Example {
                    post: "old post".into(),
                    response: "old reply".into(),
                },
                Example {
                    post: "new post".into(),
                    response: "new reply".into(),
                },
            ],
        }
    }

    fn generator(provider: Arc<ScriptedProvider>, max_attempts: usize) -> ResponseGenerator {
        let chain = ProviderChain::new(ChainConfig {
            base_delay: Duration::from_millis(1),
            ..Default::default()
        })
        .add_provider(ChainedProvider::new(provider));

        ResponseGenerator::new(
            chain,
            ResponseValidator::new(ValidatorConfig::default()),
            GenerationParams::default(),
            3,
            80,
            max_attempts,
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            target_post: "I think layers map to envelopes.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_accepts_first_valid_response() {
        let provider = ScriptedProvider::new(&["Nice observation about the layering."]);
        let result = generator(provider, 3)
            .respond(&week(), &request())
            .await
            .unwrap();

        assert_eq!(result.text, "Nice observation about the layering.");
        assert_eq!(result.provider, "scripted");
        assert_eq!(result.attempts, 1);
        assert_eq!(result.validation, ValidationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_regenerates_after_rejection() {
        let overlong = "word ".repeat(200);
        let provider = ScriptedProvider::new(&[&overlong, "Short and valid reply."]);
        let result = generator(provider, 3)
            .respond(&week(), &request())
            .await
            .unwrap();

        assert_eq!(result.text, "Short and valid reply.");
        assert_eq!(result.attempts, 2);
        assert_eq!(
            result.validation,
            ValidationStatus::AcceptedAfterRetry { rejections: 1 }
        );
    }

    #[tokio::test]
    async fn test_attempt_ceiling_terminates() {
        let overlong = "word ".repeat(200);
        let provider = ScriptedProvider::new(&[&overlong]);
        let err = generator(provider.clone(), 3)
            .respond(&week(), &request())
            .await
            .unwrap_err();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        match err {
            ScribeError::ResponseRejected { attempts, reason } => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("limit is 80"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
