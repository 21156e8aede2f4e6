//! Response Validation
//!
//! Enforces length, format, and leakage constraints on generated text before
//! it is handed to the automation layer. The validator accepts or rejects;
//! it never rewrites. Overflow is rejected rather than truncated, since a
//! cut could land mid-sentence.

use std::fmt;

use tracing::debug;

use crate::constants::generation;

/// Why a generated response was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Empty after trimming
    Empty,
    /// Word count exceeds the configured ceiling
    TooManyWords { words: usize, max: usize },
    /// The model echoed instruction text back
    LeakageMarker { marker: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "response is empty"),
            Self::TooManyWords { words, max } => {
                write!(f, "response has {} words, limit is {}", words, max)
            }
            Self::LeakageMarker { marker } => {
                write!(f, "response leaks instruction text: {:?}", marker)
            }
        }
    }
}

/// Validator configuration
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum accepted word count
    pub max_words: usize,
    /// Case-insensitive markers whose presence indicates the model echoed
    /// its instructions instead of answering
    pub leakage_markers: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_words: generation::MAX_RESPONSE_WORDS,
            leakage_markers: vec![
                "as an ai".to_string(),
                "as a language model".to_string(),
                "guidelines: match the tone".to_string(),
                "you are responding to students".to_string(),
            ],
        }
    }
}

/// Accept/reject gate for generated discussion responses
#[derive(Debug, Clone, Default)]
pub struct ResponseValidator {
    config: ValidatorConfig,
}

impl ResponseValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate raw generated text.
    ///
    /// Returns the trimmed text on acceptance; trimming is the only
    /// normalization applied, the content itself is never altered.
    pub fn validate<'a>(&self, raw: &'a str) -> Result<&'a str, RejectionReason> {
        let text = raw.trim();

        if text.is_empty() {
            return Err(RejectionReason::Empty);
        }

        let words = text.split_whitespace().count();
        if words > self.config.max_words {
            debug!(words, max = self.config.max_words, "Rejecting overlong response");
            return Err(RejectionReason::TooManyWords {
                words,
                max: self.config.max_words,
            });
        }

        let lower = text.to_lowercase();
        for marker in &self.config.leakage_markers {
            if lower.contains(&marker.to_lowercase()) {
                return Err(RejectionReason::LeakageMarker {
                    marker: marker.clone(),
                });
            }
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(max_words: usize) -> ResponseValidator {
        ResponseValidator::new(ValidatorConfig {
            max_words,
            ..Default::default()
        })
    }

    #[test]
    fn test_accepts_reasonable_response() {
        let v = validator(80);
        let text = "Nice observation about the transport layer. The handshake \
                    detail you raised is exactly right.";
        assert_eq!(v.validate(text).unwrap(), text);
    }

    #[test]
    fn test_returns_trimmed_text() {
        let v = validator(80);
        assert_eq!(v.validate("  hello there  ").unwrap(), "hello there");
    }

    #[test]
    fn test_rejects_empty() {
        let v = validator(80);
        assert_eq!(v.validate("   \n\t  "), Err(RejectionReason::Empty));
    }

    #[test]
    fn test_rejects_overflow_never_truncates() {
        let v = validator(80);
        let long = "word ".repeat(100);
        match v.validate(&long) {
            Err(RejectionReason::TooManyWords { words, max }) => {
                assert_eq!(words, 100);
                assert_eq!(max, 80);
            }
            other => panic!("expected overflow rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_exactly_at_limit() {
        let v = validator(5);
        assert!(v.validate("one two three four five").is_ok());
        assert!(v.validate("one two three four five six").is_err());
    }

    #[test]
    fn test_rejects_instruction_leakage() {
        let v = validator(80);
        let leaked = "As an AI, I think your post is great.";
        assert!(matches!(
            v.validate(leaked),
            Err(RejectionReason::LeakageMarker { .. })
        ));
    }
}
