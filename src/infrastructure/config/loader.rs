use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::errors::PipelineError;
use crate::domain::models::Config;
use crate::infrastructure::credentials::is_env_var_name;
use crate::infrastructure::logging::looks_like_secret;

/// Largest batch the hosted index accepts in one upsert
const MAX_BATCH_SIZE: usize = 1000;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Invalid embedding dimension: {0}. Must be at least 1")]
    InvalidDimension(usize),

    #[error("Invalid top_k: {0}. Must be at least 1")]
    InvalidTopK(usize),

    #[error("Invalid batch_size: {0}. Must be between 1 and {MAX_BATCH_SIZE}")]
    InvalidBatchSize(usize),

    #[error("Invalid concurrency: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("{0} must name an environment variable, not contain a secret")]
    InlineSecret(&'static str),

    #[error("{0} must be an environment variable name (letters, digits and underscores)")]
    InvalidKeyEnv(&'static str),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .pounce/config.yaml (project config)
    /// 3. .pounce/local.yaml (local overrides, optional)
    /// 4. Environment variables (POUNCE_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".pounce/config.yaml"))
            .merge(Yaml::file(".pounce/local.yaml"))
            .merge(Env::prefixed("POUNCE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment variables still win
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("POUNCE_").split("__"))
            .extract()
            .context(format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Embedding
        require("embedding.model", &config.embedding.model)?;
        require("embedding.base_url", &config.embedding.base_url)?;
        if config.embedding.dimension == 0 {
            return Err(ConfigError::InvalidDimension(config.embedding.dimension));
        }
        key_env("embedding.api_key_env", &config.embedding.api_key_env)?;

        // Generation
        require("generation.model", &config.generation.model)?;
        require("generation.base_url", &config.generation.base_url)?;
        if config.generation.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(config.generation.max_tokens));
        }
        key_env("generation.api_key_env", &config.generation.api_key_env)?;

        // Vector index
        require("vector_index.name", &config.vector_index.name)?;
        require("vector_index.control_url", &config.vector_index.control_url)?;
        key_env("vector_index.api_key_env", &config.vector_index.api_key_env)?;

        // Retrieval and indexing
        if config.retrieval.top_k == 0 {
            return Err(ConfigError::InvalidTopK(config.retrieval.top_k));
        }
        if config.indexer.batch_size == 0 || config.indexer.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize(config.indexer.batch_size));
        }
        if config.indexer.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(config.indexer.concurrency));
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        // Rate limit
        if config.rate_limit.requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(
                config.rate_limit.requests_per_second,
            ));
        }
        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }

        // Retry; max_retries of 0 disables retrying
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyField(field))
    } else {
        Ok(())
    }
}

fn key_env(field: &'static str, value: &str) -> Result<(), ConfigError> {
    require(field, value)?;
    if looks_like_secret(value) {
        return Err(ConfigError::InlineSecret(field));
    }
    if !is_env_var_name(value) {
        return Err(ConfigError::InvalidKeyEnv(field));
    }
    Ok(())
}
