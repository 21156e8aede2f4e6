//! Configuration
//!
//! Validated runtime configuration with a figment resolution chain
//! (defaults → TOML file → environment).

mod loader;
mod types;

pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};
pub use types::{
    ChainTuning, Config, DocumentsConfig, GenerationConfig, ProviderOverrides, ProvidersConfig,
};
