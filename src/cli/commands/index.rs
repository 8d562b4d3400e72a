//! Implementation of the `pounce index` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::progress::{create_progress_bar, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::PipelineError;
use crate::domain::models::Config;
use crate::infrastructure::backends::{Backends, Mode};
use crate::infrastructure::corpus;

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Chunk file or directory of chunk files (defaults to corpus.path)
    #[arg(long, value_name = "PATH")]
    pub corpus: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct IndexOutput {
    pub success: bool,
    pub corpus: PathBuf,
    pub mode: Mode,
    pub index: String,
    pub chunks: usize,
    pub written: usize,
    pub batches: usize,
}

impl CommandOutput for IndexOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Indexed {} of {} chunks from {} into '{}' ({} batches)",
            self.written,
            self.chunks,
            self.corpus.display(),
            self.index,
            self.batches
        )];
        if self.mode == Mode::Offline {
            lines.push("Offline mode: records were written to an in-memory index and discarded on exit.".to_string());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: IndexArgs, config: &Config, offline: bool, json_mode: bool) -> Result<()> {
    let corpus_path = args.corpus.unwrap_or_else(|| config.corpus.path.clone());
    let chunks = corpus::load(&corpus_path)
        .map_err(PipelineError::from)
        .with_context(|| format!("Failed to load corpus from {}", corpus_path.display()))?;

    let backends = Backends::connect(config, offline)?;
    let spec = backends.index_spec();
    if backends.mode() == Mode::Offline {
        backends.provisioner().ensure_index(&spec).await?;
    }

    let indexer = backends.indexer().await?;
    let pb = create_progress_bar(chunks.len() as u64, json_mode);
    pb.set_message("upserting");

    let report = match indexer
        .index_with_progress(&chunks, |written| pb.set_position(written as u64))
        .await
    {
        Ok(report) => report,
        Err(e) => {
            pb.finish_error("indexing failed");
            return Err(e).context("Failed to index corpus");
        }
    };
    pb.finish_success(format!("{} records written", report.written));

    let output_data = IndexOutput {
        success: true,
        corpus: corpus_path,
        mode: backends.mode(),
        index: spec.name,
        chunks: chunks.len(),
        written: report.written,
        batches: report.batches,
    };

    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_output_human() {
        let output_data = IndexOutput {
            success: true,
            corpus: PathBuf::from("data/chunks.yaml"),
            mode: Mode::Offline,
            index: "pounce".to_string(),
            chunks: 9,
            written: 9,
            batches: 1,
        };

        let human = output_data.to_human();
        assert!(human.starts_with("Indexed 9 of 9 chunks from data/chunks.yaml into 'pounce' (1 batches)"));
        assert!(human.contains("in-memory"));
        assert_eq!(output_data.to_json()["written"], 9);
    }
}
