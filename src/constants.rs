//! Global Constants
//!
//! Centralized defaults for configuration and tuning.
//! All magic numbers should be defined here with documentation.
//! Runtime behavior is driven by [`crate::config::Config`], which seeds its
//! defaults from these values.

/// Provider chain constants
pub mod chain {
    /// Maximum total attempts across all providers in one request
    pub const MAX_TOTAL_ATTEMPTS: usize = 10;

    /// Default maximum attempts per provider (first try + retries)
    pub const DEFAULT_MAX_RETRIES: u8 = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;

    /// Default per-attempt request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

/// Response generation constants
pub mod generation {
    /// Sampling temperature for discussion responses
    pub const TEMPERATURE: f32 = 0.8;

    /// Hard ceiling on response word count (overflow is rejected, never cut)
    pub const MAX_RESPONSE_WORDS: usize = 80;

    /// Number of few-shot example pairs included in the prompt
    pub const FEW_SHOT_K: usize = 3;

    /// Maximum tokens requested from the provider
    pub const MAX_OUTPUT_TOKENS: usize = 512;

    /// Overall attempt ceiling across generate + validate cycles
    pub const MAX_GENERATION_ATTEMPTS: usize = 3;

    /// Probability of appending a follow-up-question instruction
    pub const FOLLOW_UP_PROBABILITY: f64 = 0.05;

    /// Probability of injecting each additional preferred phrase
    pub const PHRASE_SELECTION_PROBABILITY: f64 = 0.3;

    /// Character cap for a formatted example post
    pub const EXAMPLE_POST_MAX_CHARS: usize = 1000;

    /// Character cap for a formatted example response
    pub const EXAMPLE_RESPONSE_MAX_CHARS: usize = 800;
}

/// Provider model defaults
pub mod models {
    pub const OPENAI_MODEL: &str = "gpt-4o";
    pub const ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
    pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
    /// DeepSeek exposes an OpenAI-compatible chat completions API
    pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";
}

/// Course document constants
pub mod course {
    /// Default path to the course document
    pub const COURSES_FILE: &str = "courses.json";

    /// Default path to the announcement document
    pub const ANNOUNCEMENTS_FILE: &str = "announcements.json";

    /// Placeholder topic ids that must be rejected when targeted
    pub const TOPIC_ID_PLACEHOLDERS: &[&str] = &["FILL_ME", "TODO", "TBD"];

    /// Week-number substitution token in announcement title/content
    pub const WEEK_TOKEN: &str = "{w}";
}
