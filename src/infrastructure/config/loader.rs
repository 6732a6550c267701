use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_attempts: {0}. Must be between 1 and 10")]
    InvalidMaxAttempts(u32),

    #[error("Invalid max_tokens: {0}. Must be positive")]
    InvalidMaxTokens(u32),

    #[error("Invalid temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid context_window_chars: {0}. Must be positive")]
    InvalidContextWindow(usize),

    #[error("Invalid overlap_window_chars: {0}. Must be positive")]
    InvalidOverlapWindow(usize),

    #[error(
        "Invalid escalation: step {0} with ceiling {1}. Step must be positive and at most the ceiling"
    )]
    InvalidEscalation(f32, f32),

    #[error("Backend base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Backend deployment cannot be empty")]
    EmptyDeployment,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. codemorph.yaml in the working directory
    /// 3. Environment variables (CODEMORPH_* prefix, highest priority)
    ///
    /// Nested keys are addressed with a double underscore, e.g.
    /// CODEMORPH_BACKEND__API_KEY overrides backend.api_key.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("codemorph.yaml"))
            .merge(Env::prefixed("CODEMORPH_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("CODEMORPH_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.engine.max_attempts == 0 || config.engine.max_attempts > 10 {
            return Err(ConfigError::InvalidMaxAttempts(config.engine.max_attempts));
        }

        if config.engine.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(config.engine.max_tokens));
        }

        if !(0.0..=2.0).contains(&config.engine.temperature) {
            return Err(ConfigError::InvalidTemperature(config.engine.temperature));
        }

        if config.engine.context_window_chars == 0 {
            return Err(ConfigError::InvalidContextWindow(
                config.engine.context_window_chars,
            ));
        }

        if config.engine.overlap_window_chars == 0 {
            return Err(ConfigError::InvalidOverlapWindow(
                config.engine.overlap_window_chars,
            ));
        }

        if config.escalation.step <= 0.0 || config.escalation.step > config.escalation.ceiling {
            return Err(ConfigError::InvalidEscalation(
                config.escalation.step,
                config.escalation.ceiling,
            ));
        }

        if config.backend.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        if config.backend.deployment.is_empty() {
            return Err(ConfigError::EmptyDeployment);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
