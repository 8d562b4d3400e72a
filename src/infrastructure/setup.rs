//! Pounce project initialization
//!
//! `pounce setup` writes a commented default configuration to
//! `.pounce/config.yaml` (unless one exists) before provisioning the index.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Pounce Configuration
# Override settings by editing this file, adding .pounce/local.yaml, or setting
# environment variables with the POUNCE_ prefix (use __ for nesting).
#
# Example environment variables:
#   export POUNCE_RETRIEVAL__TOP_K=5
#   export POUNCE_VECTOR_INDEX__NAMESPACE=fall-2025
#   export POUNCE_LOGGING__LEVEL=debug
#
# API keys are never stored here. Each *_env setting names the environment
# variable the key is read from.

embedding:
  model: "text-embedding-3-small"
  dimension: 1536
  base_url: "https://api.openai.com"
  api_key_env: "OPENAI_API_KEY"

generation:
  model: "gpt-4o-mini"
  base_url: "https://api.openai.com"
  api_key_env: "OPENAI_API_KEY"
  max_tokens: 500
  institution: "Georgia State University"

vector_index:
  name: "gsu-chatbot"
  # Empty namespace is the index default
  namespace: ""
  metric: "cosine"
  cloud: "aws"
  region: "us-east-1"
  # Data-plane host; looked up from the control plane when unset
  # host: "gsu-chatbot-xxxxxxx.svc.aped-4627-b74a.pinecone.io"
  api_key_env: "PINECONE_API_KEY"
  # Seconds `pounce setup` waits for a new index to become ready
  ready_timeout_secs: 120

retrieval:
  # Passages placed in each prompt
  top_k: 3

indexer:
  # Records per upsert request (1-1000)
  batch_size: 100
  # Embedding requests kept in flight
  concurrency: 4

corpus:
  # Chunk file (JSON/YAML) or directory of chunk files
  path: "data/chunks.yaml"

logging:
  # Log level: trace, debug, info, warn, error
  level: "warn"
  # Log format: json, pretty
  format: "pretty"
  # Uncomment to also write JSON logs to rotating files
  # log_dir: ".pounce/logs"
  rotation: "daily"

# Outbound rate limiting, per provider client
rate_limit:
  requests_per_second: 10.0
  burst_size: 20

# Retry policy for transient failures (429, 5xx, timeouts)
retry:
  max_retries: 3
  initial_backoff_ms: 1000
  max_backoff_ms: 30000
"#;

/// Setup paths and directories
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl SetupPaths {
    /// Get setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::in_dir(&current_dir))
    }

    pub fn in_dir(root: &Path) -> Self {
        let config_dir = root.join(".pounce");
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Write the default configuration file
///
/// Returns `true` when a file was written, `false` when one already existed
/// and `force` was not set.
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")?;
    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE)
        .context("Failed to write config file")?;

    Ok(true)
}
