//! Provider status: credentials, reachability and index readiness
//!
//! Each provider is checked on its own so one failure does not hide the
//! others. Credentials are reported by variable name only.

use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

use crate::domain::errors::PipelineResult;
use crate::domain::models::{Config, IndexDescription};
use crate::domain::ports::{ChatModel, EmbeddingProvider, IndexProvisioner};
use crate::infrastructure::backends::{chat_model, openai_embedder, pinecone_control, Mode};
use crate::infrastructure::credentials::{is_env_var_name, ApiKey};

/// Whether a configured key variable is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub env: String,
    pub set: bool,
}

/// Availability of one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    /// `openai`, `pinecone`, `hashing` or `memory`
    pub provider: String,

    /// Model or index name
    pub target: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProviderStatus {
    fn up(provider: &str, target: &str) -> Self {
        Self {
            provider: provider.to_string(),
            target: target.to_string(),
            available: true,
            detail: None,
        }
    }

    fn down(provider: &str, target: &str, detail: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            target: target.to_string(),
            available: false,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub mode: Mode,
    pub credentials: Vec<CredentialStatus>,
    pub embedding: ProviderStatus,
    pub index: ProviderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_details: Option<IndexDescription>,
    pub generation: ProviderStatus,
}

impl StatusReport {
    /// True when every provider the mode needs is available
    pub const fn healthy(&self) -> bool {
        self.embedding.available && self.index.available && self.generation.available
    }
}

/// Check every provider `config` points at
pub async fn check(config: &Config, offline: bool) -> StatusReport {
    let mode = if offline { Mode::Offline } else { Mode::Hosted };
    let credentials = credential_status(config, mode);

    let (embedding, index, index_details) = if offline {
        (
            ProviderStatus::up("hashing", "feature-hashing"),
            ProviderStatus {
                detail: Some("in-process index, rebuilt from the corpus on each run".to_string()),
                ..ProviderStatus::up("memory", &config.vector_index.name)
            },
            None,
        )
    } else {
        let embedding = check_provider("openai", &config.embedding.model, async {
            openai_embedder(config)?.health_check().await
        })
        .await;
        let (index, details) = index_status(config).await;
        (embedding, index, details)
    };

    let generation = check_provider("openai", &config.generation.model, async {
        chat_model(config)?.health_check().await
    })
    .await;

    let report = StatusReport {
        mode,
        credentials,
        embedding,
        index,
        index_details,
        generation,
    };
    debug!(healthy = report.healthy(), "status checked");
    report
}

fn credential_status(config: &Config, mode: Mode) -> Vec<CredentialStatus> {
    let mut names = Vec::new();
    if mode == Mode::Hosted {
        names.push(config.embedding.api_key_env.as_str());
        names.push(config.vector_index.api_key_env.as_str());
    }
    names.push(config.generation.api_key_env.as_str());

    let mut seen = Vec::new();
    names
        .into_iter()
        .filter(|name| {
            if seen.contains(name) {
                false
            } else {
                seen.push(*name);
                true
            }
        })
        .map(|name| {
            if is_env_var_name(name) {
                CredentialStatus {
                    env: name.to_string(),
                    set: ApiKey::from_env(name).is_ok(),
                }
            } else {
                CredentialStatus {
                    env: "[invalid name]".to_string(),
                    set: false,
                }
            }
        })
        .collect()
}

async fn check_provider<F>(provider: &str, target: &str, check: F) -> ProviderStatus
where
    F: Future<Output = PipelineResult<()>>,
{
    match check.await {
        Ok(()) => ProviderStatus::up(provider, target),
        Err(e) => {
            warn!(provider, target, error = %e, "provider unavailable");
            ProviderStatus::down(provider, target, e.to_string())
        }
    }
}

async fn index_status(config: &Config) -> (ProviderStatus, Option<IndexDescription>) {
    let name = config.vector_index.name.as_str();
    let described = async {
        let (_, control) = pinecone_control(config)?;
        control.describe(name).await
    }
    .await;

    match described {
        Ok(Some(details)) if details.ready => (ProviderStatus::up("pinecone", name), Some(details)),
        Ok(Some(details)) => (
            ProviderStatus::down("pinecone", name, "index is not ready yet"),
            Some(details),
        ),
        Ok(None) => (
            ProviderStatus::down(
                "pinecone",
                name,
                "index does not exist; run `pounce setup` first",
            ),
            None,
        ),
        Err(e) => {
            warn!(index = name, error = %e, "index unavailable");
            (ProviderStatus::down("pinecone", name, e.to_string()), None)
        }
    }
}
