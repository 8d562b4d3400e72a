//! Composition root: builds the provider clients once and hands out the
//! pipeline services with their ports injected.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::{Config, IndexSpec};
use crate::domain::ports::{ChatModel, EmbeddingProvider, IndexProvisioner, VectorIndex};
use crate::infrastructure::credentials::ApiKey;
use crate::infrastructure::http::RetryPolicy;
use crate::infrastructure::openai::{OpenAiChatModel, OpenAiClient, OpenAiClientConfig, OpenAiEmbedder};
use crate::infrastructure::pinecone::{
    PineconeClientConfig, PineconeControl, PineconeIndex, PineconeTransport, DEFAULT_POLL_INTERVAL,
};
use crate::infrastructure::vector::{HashingEmbedder, InMemoryVectorIndex};
use crate::services::{Advisor, Answerer, Indexer, PromptBuilder, Retriever};

/// Where vectors come from and go to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// OpenAI embeddings and a Pinecone index
    Hosted,
    /// Feature-hashing embeddings and an in-process index
    Offline,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hosted => "hosted",
            Self::Offline => "offline",
        }
    }
}

enum IndexBackend {
    Hosted {
        transport: Arc<PineconeTransport>,
        control: Arc<PineconeControl>,
    },
    Offline(Arc<InMemoryVectorIndex>),
}

/// Embedding and vector index adapters for one run
pub struct Backends {
    config: Config,
    mode: Mode,
    embedder: Arc<dyn EmbeddingProvider>,
    index: IndexBackend,
}

impl Backends {
    pub fn connect(config: &Config, offline: bool) -> PipelineResult<Self> {
        if offline {
            Self::offline(config)
        } else {
            Self::hosted(config)
        }
    }

    pub fn hosted(config: &Config) -> PipelineResult<Self> {
        let embedder = openai_embedder(config)?;
        let (transport, control) = pinecone_control(config)?;

        debug!(index = %config.vector_index.name, "hosted backends ready");
        Ok(Self {
            config: config.clone(),
            mode: Mode::Hosted,
            embedder,
            index: IndexBackend::Hosted { transport, control },
        })
    }

    pub fn offline(config: &Config) -> PipelineResult<Self> {
        let dimension = config.embedding.dimension;
        debug!(dimension, "offline backends ready");
        Ok(Self {
            config: config.clone(),
            mode: Mode::Offline,
            embedder: Arc::new(HashingEmbedder::new(dimension)?),
            index: IndexBackend::Offline(Arc::new(InMemoryVectorIndex::new(
                dimension,
                config.vector_index.metric,
            ))),
        })
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub fn embedder(&self) -> Arc<dyn EmbeddingProvider> {
        self.embedder.clone()
    }

    pub fn index_spec(&self) -> IndexSpec {
        let vi = &self.config.vector_index;
        IndexSpec {
            name: vi.name.clone(),
            dimension: self.config.embedding.dimension,
            metric: vi.metric,
            cloud: vi.cloud.clone(),
            region: vi.region.clone(),
        }
    }

    pub fn provisioner(&self) -> Arc<dyn IndexProvisioner> {
        match &self.index {
            IndexBackend::Hosted { control, .. } => control.clone(),
            IndexBackend::Offline(index) => index.clone(),
        }
    }

    /// Data-plane handle; the hosted host is looked up when not configured
    pub async fn vector_index(&self) -> PipelineResult<Arc<dyn VectorIndex>> {
        match &self.index {
            IndexBackend::Offline(index) => Ok(index.clone()),
            IndexBackend::Hosted { transport, control } => {
                let vi = &self.config.vector_index;
                let host = match vi.host.as_deref().filter(|h| !h.trim().is_empty()) {
                    Some(host) => host.to_string(),
                    None => control.resolve_host(&vi.name).await?,
                };
                info!(index = %vi.name, host = %host, namespace = %vi.namespace, "using hosted index");
                Ok(Arc::new(PineconeIndex::new(
                    transport.clone(),
                    &host,
                    vi.namespace.clone(),
                )))
            }
        }
    }

    pub async fn indexer(&self) -> PipelineResult<Indexer> {
        Ok(Indexer::new(
            self.embedder(),
            self.vector_index().await?,
            &self.config.indexer,
        ))
    }

    pub async fn retriever(&self) -> PipelineResult<Retriever> {
        Ok(Retriever::new(self.embedder(), self.vector_index().await?))
    }

    pub async fn advisor(&self, model: Arc<dyn ChatModel>) -> PipelineResult<Advisor> {
        let generation = &self.config.generation;
        let answerer = Answerer::new(
            model,
            PromptBuilder::new(generation.institution.clone()),
            generation.max_tokens,
        );
        Ok(Advisor::new(
            self.retriever().await?,
            answerer,
            self.config.retrieval.top_k,
        ))
    }
}

/// OpenAI embeddings client built from the embedding config
pub fn openai_embedder(config: &Config) -> PipelineResult<Arc<OpenAiEmbedder>> {
    let key = ApiKey::from_env(&config.embedding.api_key_env)?;
    let client = Arc::new(openai_client(
        config,
        &key,
        &config.embedding.base_url,
        config.embedding.timeout_secs,
    )?);
    Ok(Arc::new(OpenAiEmbedder::new(
        client,
        config.embedding.model.clone(),
        config.embedding.dimension,
    )))
}

/// Pinecone transport plus the control plane built on it
pub fn pinecone_control(
    config: &Config,
) -> PipelineResult<(Arc<PineconeTransport>, Arc<PineconeControl>)> {
    let vi = &config.vector_index;
    let key = ApiKey::from_env(&vi.api_key_env)?;
    let transport = Arc::new(
        PineconeTransport::new(PineconeClientConfig {
            api_key: key.expose().to_string(),
            api_version: vi.api_version.clone(),
            rate_limit_rps: config.rate_limit.requests_per_second,
            burst_size: config.rate_limit.burst_size,
            retry_policy: RetryPolicy::from(&config.retry),
            timeout_secs: vi.timeout_secs,
        })
        .map_err(PipelineError::from)?,
    );
    let control = Arc::new(
        PineconeControl::new(transport.clone(), &vi.control_url).with_readiness(
            Duration::from_secs(vi.ready_timeout_secs),
            DEFAULT_POLL_INTERVAL,
        ),
    );
    Ok((transport, control))
}

/// Generative model client; needed in both modes
pub fn chat_model(config: &Config) -> PipelineResult<Arc<dyn ChatModel>> {
    let generation = &config.generation;
    let key = ApiKey::from_env(&generation.api_key_env)?;
    let client = Arc::new(openai_client(
        config,
        &key,
        &generation.base_url,
        generation.timeout_secs,
    )?);
    Ok(Arc::new(OpenAiChatModel::new(client, generation.model.clone())))
}

fn openai_client(
    config: &Config,
    key: &ApiKey,
    base_url: &str,
    timeout_secs: u64,
) -> PipelineResult<OpenAiClient> {
    OpenAiClient::new(OpenAiClientConfig {
        api_key: key.expose().to_string(),
        base_url: base_url.to_string(),
        rate_limit_rps: config.rate_limit.requests_per_second,
        burst_size: config.rate_limit.burst_size,
        retry_policy: RetryPolicy::from(&config.retry),
        timeout_secs,
    })
    .map_err(|e| PipelineError::Configuration(format!("failed to build OpenAI client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Chunk, Provisioned};

    fn small_config() -> Config {
        let mut config = Config::default();
        config.embedding.dimension = 64;
        config
    }

    #[tokio::test]
    async fn test_offline_backends_share_one_index() {
        let backends = Backends::offline(&small_config()).unwrap();
        assert_eq!(backends.mode(), Mode::Offline);

        let spec = backends.index_spec();
        assert_eq!(spec.dimension, 64);
        assert_eq!(
            backends.provisioner().ensure_index(&spec).await.unwrap(),
            Provisioned::Created
        );

        let indexer = backends.indexer().await.unwrap();
        indexer
            .index(&[Chunk::new("financial_aid_1", "FAFSA must be submitted by March 1.").unwrap()])
            .await
            .unwrap();

        let context = backends
            .retriever()
            .await
            .unwrap()
            .retrieve("FAFSA submitted", 3)
            .await
            .unwrap();
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_hosted_requires_credentials() {
        let mut config = small_config();
        config.embedding.api_key_env = "POUNCE_TEST_UNSET_OPENAI".to_string();
        temp_env::with_var_unset("POUNCE_TEST_UNSET_OPENAI", || {
            assert!(matches!(
                Backends::hosted(&config),
                Err(PipelineError::Configuration(_))
            ));
        });
    }

    #[test]
    fn test_chat_model_requires_credentials() {
        let mut config = small_config();
        config.generation.api_key_env = "POUNCE_TEST_UNSET_CHAT".to_string();
        temp_env::with_var_unset("POUNCE_TEST_UNSET_CHAT", || {
            assert!(chat_model(&config).is_err());
        });
    }
}
