//! Implementation of the `pounce search` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::prepare_offline_index;
use crate::cli::output::progress::create_spinner;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, RetrievedPassage};
use crate::infrastructure::backends::Backends;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Question to retrieve passages for
    pub question: String,

    /// Number of passages to return (defaults to retrieval.top_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub question: String,
    pub top_k: usize,
    pub passages: Vec<RetrievedPassage>,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if self.passages.is_empty() {
            return "No matching passages found.".to_string();
        }
        TableFormatter::new().format_passages(&self.passages)
    }
}

pub async fn execute(args: SearchArgs, config: &Config, offline: bool, json_mode: bool) -> Result<()> {
    let backends = Backends::connect(config, offline)?;
    prepare_offline_index(&backends, config, json_mode).await?;

    let top_k = args.top_k.unwrap_or(config.retrieval.top_k);
    let retriever = backends.retriever().await?;

    let spinner = create_spinner("Searching", json_mode);
    let context = retriever
        .retrieve(&args.question, top_k)
        .await
        .context("Failed to retrieve passages");
    spinner.finish_and_clear();

    let output_data = SearchOutput {
        question: args.question,
        top_k,
        passages: context?.into_passages(),
    };

    output(&output_data, json_mode);
    Ok(())
}
