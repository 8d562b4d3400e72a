use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::client::PineconeTransport;
use super::errors::PineconeError;
use super::types::{CreateIndexRequest, IndexList, IndexModel};
use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::{IndexDescription, IndexSpec, Provisioned};
use crate::domain::ports::IndexProvisioner;

const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(120);

/// Pause between index descriptions while waiting for readiness
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Control plane client: lists, describes and creates indexes
pub struct PineconeControl {
    transport: Arc<PineconeTransport>,
    control_url: String,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl PineconeControl {
    pub fn new(transport: Arc<PineconeTransport>, control_url: &str) -> Self {
        Self {
            transport,
            control_url: control_url.trim_end_matches('/').to_string(),
            ready_timeout: DEFAULT_READY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Bound the wait for an index to report ready
    #[must_use]
    pub const fn with_readiness(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.ready_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    pub async fn list_indexes(&self) -> Result<Vec<IndexModel>, PineconeError> {
        let url = format!("{}/indexes", self.control_url);
        let list: IndexList = self.transport.send(|http| http.get(&url)).await?;
        Ok(list.indexes)
    }

    pub async fn describe_index(&self, name: &str) -> Result<IndexModel, PineconeError> {
        let url = format!("{}/indexes/{}", self.control_url, name);
        self.transport.send(|http| http.get(&url)).await
    }

    /// Host of a named index, needed by the data plane
    pub async fn resolve_host(&self, name: &str) -> PipelineResult<String> {
        let model = self.describe_index(name).await.map_err(|e| match e {
            PineconeError::NotFound(_) => PipelineError::Index(format!(
                "index '{name}' does not exist; run `pounce setup` first"
            )),
            other => other.into(),
        })?;

        model
            .host
            .filter(|h| !h.is_empty())
            .ok_or_else(|| PipelineError::Index(format!("index '{name}' has no host yet")))
    }

    /// Poll the index description until it reports ready
    async fn wait_until_ready(&self, name: &str) -> PipelineResult<()> {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            let index = self.describe_index(name).await?;
            if index.is_ready() {
                info!(index = name, "index ready");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PipelineError::Index(format!(
                    "index '{name}' not ready after {}s (state: {})",
                    self.ready_timeout.as_secs(),
                    index.state()
                )));
            }
            debug!(index = name, state = index.state(), "waiting for index");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

fn check_compatible(existing: &IndexModel, spec: &IndexSpec) -> PipelineResult<()> {
    if existing.dimension != spec.dimension {
        return Err(PipelineError::Index(format!(
            "index '{}' exists with dimension {}, expected {}",
            existing.name, existing.dimension, spec.dimension
        )));
    }
    match existing.metric {
        Some(metric) if metric != spec.metric => Err(PipelineError::Index(format!(
            "index '{}' exists with metric {metric}, expected {}",
            existing.name, spec.metric
        ))),
        _ => Ok(()),
    }
}

#[async_trait]
impl IndexProvisioner for PineconeControl {
    #[instrument(skip(self, spec), fields(name = %spec.name, dimension = spec.dimension))]
    async fn ensure_index(&self, spec: &IndexSpec) -> PipelineResult<Provisioned> {
        let existing = self.list_indexes().await?;
        if let Some(index) = existing.iter().find(|i| i.name == spec.name) {
            check_compatible(index, spec)?;
            if !index.is_ready() {
                self.wait_until_ready(&spec.name).await?;
            }
            info!("index already exists");
            return Ok(Provisioned::AlreadyExists);
        }

        let request = CreateIndexRequest::from(spec);
        let url = format!("{}/indexes", self.control_url);

        match self
            .transport
            .send::<IndexModel, _>(|http| http.post(&url).json(&request))
            .await
        {
            Ok(created) => {
                info!(metric = %spec.metric, cloud = %spec.cloud, region = %spec.region, "index created");
                if !created.is_ready() {
                    self.wait_until_ready(&spec.name).await?;
                }
                Ok(Provisioned::Created)
            }
            // Created concurrently between the list and the create
            Err(PineconeError::AlreadyExists(_)) => {
                let index = self.describe_index(&spec.name).await?;
                check_compatible(&index, spec)?;
                if !index.is_ready() {
                    self.wait_until_ready(&spec.name).await?;
                }
                Ok(Provisioned::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn describe(&self, name: &str) -> PipelineResult<Option<IndexDescription>> {
        match self.describe_index(name).await {
            Ok(model) => Ok(Some(model.into())),
            Err(PineconeError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
