//! CLI command implementations.

pub mod ask;
pub mod index;
pub mod search;
pub mod setup;
pub mod split;
pub mod status;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::cli::output::progress::create_spinner;
use crate::domain::errors::PipelineError;
use crate::domain::models::Config;
use crate::infrastructure::backends::{Backends, Mode};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::corpus;

/// Load configuration from `path`, or from the default layered locations
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Offline indexes live only as long as the process, so commands that read
/// from one load the configured corpus into it first
pub(crate) async fn prepare_offline_index(
    backends: &Backends,
    config: &Config,
    json_mode: bool,
) -> Result<()> {
    if backends.mode() != Mode::Offline {
        return Ok(());
    }

    let chunks = corpus::load(&config.corpus.path)
        .map_err(PipelineError::from)
        .with_context(|| format!("Failed to load corpus from {}", config.corpus.path.display()))?;

    backends
        .provisioner()
        .ensure_index(&backends.index_spec())
        .await
        .context("Failed to create in-memory index")?;

    let spinner = create_spinner(format!("Indexing {} chunks in memory", chunks.len()), json_mode);
    let report = backends
        .indexer()
        .await?
        .index(&chunks)
        .await
        .context("Failed to index corpus in memory")?;
    spinner.finish_and_clear();

    info!(written = report.written, "offline index ready");
    Ok(())
}
