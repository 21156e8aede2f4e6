//! CanvaScribe - Canvas Discussion and Announcement Automation
//!
//! Generates instructor-voiced replies to Canvas discussion posts using a
//! chain of LLM providers with retry and fallback, grounded by few-shot
//! examples from each course week, and computes announcement publish
//! schedules from course start dates.
//!
//! ## Modules
//!
//! - [`course`]: course document model and week arithmetic
//! - [`fewshot`]: deterministic few-shot example selection
//! - [`llm`]: providers, prompt construction, chain execution, validation
//! - [`generate`]: end-to-end response generation with regeneration
//! - [`announce`]: announcement scheduling
//! - [`config`]: layered configuration (defaults, file, environment)

pub mod announce;
pub mod cli;
pub mod config;
pub mod constants;
pub mod course;
pub mod fewshot;
pub mod generate;
pub mod llm;
pub mod types;

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, LlmError, Result, ScribeError};

// Course Model
pub use course::{Course, CourseDocument, Example, WeekSpec, date_for_week, resolve_week};

// Generation
pub use generate::{GenerationRequest, GenerationResult, ResponseGenerator};
pub use llm::{
    Credentials, GenerationParams, LlmProvider, PromptBuilder, ProviderChain, ProviderKind,
    ResponseValidator, StructuredPrompt,
};

// Scheduling
pub use announce::{Announcement, AnnouncementDocument, ScheduleEntry, schedule};
