//! Prompt Construction
//!
//! Composes the week's discussion prompt, few-shot exemplars, and the target
//! student post into a provider-neutral [`StructuredPrompt`]. Provider
//! adapters reshape this into their own transport framing (message roles,
//! system fields); the builder is the single source of truth for content.
//!
//! The target post is never truncated here. If the assembled prompt exceeds
//! a provider's input limit, the adapter surfaces `PayloadTooLarge`.

use rand::Rng;

use crate::constants::generation;
use crate::course::Example;

/// Natural phrases injected into the style instruction so responses read
/// like the instructor, not a model.
const PREFERRED_PHRASES: &[&str] = &[
    "awesome",
    "spot on",
    "it's really interesting that",
    "that's a great point",
    "I like how you",
    "that's exactly right",
    "nice observation",
    "you're onto something there",
];

const FOLLOW_UP_INSTRUCTION: &str =
    " Additionally, ask a thoughtful follow-up question to deepen the student's thinking.";

/// Provider-neutral prompt representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredPrompt {
    /// System/instruction segment: week prompt plus fixed style constraints
    pub instruction: String,
    /// Ordered few-shot exemplar pairs
    pub examples: Vec<Example>,
    /// The student post to respond to, verbatim
    pub target_post: String,
}

impl StructuredPrompt {
    /// Approximate payload size in characters, used by adapters for their
    /// input-limit check.
    pub fn approx_chars(&self) -> usize {
        self.instruction.len()
            + self.target_post.len()
            + self
                .examples
                .iter()
                .map(|e| e.post.len() + e.response.len())
                .sum::<usize>()
    }
}

/// Builder for discussion-response prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    week_prompt: String,
    max_words: usize,
    preferred_phrases: String,
    follow_up: bool,
}

impl PromptBuilder {
    pub fn new(week_prompt: impl Into<String>) -> Self {
        Self {
            week_prompt: week_prompt.into(),
            max_words: generation::MAX_RESPONSE_WORDS,
            preferred_phrases: format!("\"{}\"", PREFERRED_PHRASES[0]),
            follow_up: false,
        }
    }

    pub fn max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    /// Set the preferred-phrase list injected into the style guidelines.
    pub fn preferred_phrases(mut self, phrases: impl Into<String>) -> Self {
        self.preferred_phrases = phrases.into();
        self
    }

    /// Append the follow-up-question instruction.
    pub fn follow_up(mut self, follow_up: bool) -> Self {
        self.follow_up = follow_up;
        self
    }

    /// Randomize phrase injection and follow-up per the configured odds.
    /// Takes the RNG by argument so tests stay deterministic.
    pub fn randomize(self, rng: &mut impl Rng) -> Self {
        let follow_up = rng.random_bool(generation::FOLLOW_UP_PROBABILITY);
        self.preferred_phrases(pick_phrases(rng)).follow_up(follow_up)
    }

    /// Compose the final prompt for a target post.
    ///
    /// Exemplar sides are capped to keep the few-shot block bounded; the
    /// target post is passed through untouched.
    pub fn build(&self, examples: &[Example], target_post: &str) -> StructuredPrompt {
        let mut instruction = format!(
            "You are responding to students in a college discussion board. The week's \
             discussion prompt is:\n{}\n\n\
             You will be shown example student posts with the instructor's feedback. \
             Read the student's reply and respond with simple, short 3-4 sentence \
             feedback (max {} words) that a college student would understand, in the \
             exact same style as the example responses.\n\n\
             Guidelines: Match the tone and style exactly from the examples. Use \
             natural, human language like {}. Strike a balance between friendly and \
             professional - sound like a real person, not an AI. Avoid generic phrases \
             like \"good job\" or \"well done\". Never use exclamation marks. Avoid \
             formulaic closing sentences that start with \"Keep...\" or end with \
             encouraging phrases about future learning.",
            self.week_prompt, self.max_words, self.preferred_phrases,
        );
        if self.follow_up {
            instruction.push_str(FOLLOW_UP_INSTRUCTION);
        }

        let examples = examples
            .iter()
            .map(|e| Example {
                post: cap_chars(&e.post, generation::EXAMPLE_POST_MAX_CHARS),
                response: cap_chars(&e.response, generation::EXAMPLE_RESPONSE_MAX_CHARS),
            })
            .collect();

        StructuredPrompt {
            instruction,
            examples,
            target_post: target_post.to_string(),
        }
    }
}

/// Pick at least one preferred phrase, each further phrase joining with the
/// configured probability, formatted as a quoted natural-language list.
pub fn pick_phrases(rng: &mut impl Rng) -> String {
    let first = PREFERRED_PHRASES[rng.random_range(0..PREFERRED_PHRASES.len())];
    let mut selected = vec![first];

    for phrase in PREFERRED_PHRASES.iter().copied() {
        if phrase != first && rng.random_bool(generation::PHRASE_SELECTION_PROBABILITY) {
            selected.push(phrase);
        }
    }

    let quoted: Vec<String> = selected.iter().map(|p| format!("\"{}\"", p)).collect();
    match quoted.as_slice() {
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
        [] => unreachable!("at least one phrase is always selected"),
    }
}

fn cap_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
