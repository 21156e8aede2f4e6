//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources:
//! 1. Built-in defaults (Serialized)
//! 2. TOML config file (canvascribe.toml, or the path passed on the CLI)
//! 3. Environment variables (CANVASCRIBE_* prefix, `__` as section separator)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::Path;

use tracing::debug;

use super::types::Config;
use crate::types::{Result, ScribeError};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "canvascribe.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults → file → env vars.
    ///
    /// A missing file is only an error when the caller named it explicitly.
    pub fn load(file: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        match file {
            Some(path) => {
                if !path.exists() {
                    return Err(ScribeError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                debug!(path = %path.display(), "Loading config file");
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    debug!(path = DEFAULT_CONFIG_FILE, "Loading config file");
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        // e.g. CANVASCRIBE_GENERATION__MAX_WORDS -> generation.max_words
        figment = figment.merge(Env::prefixed("CANVASCRIBE_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ScribeError::Config(format!("configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults_without_file() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load(None).expect("defaults load");
            assert_eq!(config.generation.max_words, 80);
            assert_eq!(config.generation.few_shot_k, 3);
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[generation]\nmax_words = 120\ntemperature = 0.5").unwrap();

        let config = ConfigLoader::load(Some(file.path())).unwrap();
        assert_eq!(config.generation.max_words, 120);
        assert_eq!(config.generation.temperature, 0.5);
        // Untouched values keep their defaults
        assert_eq!(config.generation.few_shot_k, 3);
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("canvascribe.toml", "[generation]\nmax_words = 120")?;
            jail.set_env("CANVASCRIBE_GENERATION__MAX_WORDS", "60");

            let config = ConfigLoader::load(None).expect("load");
            assert_eq!(config.generation.max_words, 60);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = ConfigLoader::load(Some(Path::new("/nonexistent/conf.toml"))).unwrap_err();
        assert!(matches!(err, ScribeError::Config(_)));
    }

    #[test]
    fn test_invalid_values_rejected_at_load() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[generation]\ntemperature = 9.0").unwrap();
        assert!(ConfigLoader::load(Some(file.path())).is_err());
    }
}
