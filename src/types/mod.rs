//! Core Types
//!
//! Shared types used across the application.

pub mod error;

pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, ProviderFailure, Result, ScribeError,
};
