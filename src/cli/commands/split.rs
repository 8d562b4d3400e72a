//! Implementation of the `pounce split` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::PipelineError;
use crate::infrastructure::corpus::{write_file, TextSplitter, DEFAULT_MAX_CHARS, DEFAULT_OVERLAP_CHARS};

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Directory of `.txt` files to split
    pub dir: PathBuf,

    /// Chunk file to write (`.json`, `.yaml` or `.yml`)
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,

    /// Topic recorded in every chunk's metadata
    #[arg(long)]
    pub topic: Option<String>,

    /// Maximum characters per chunk
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    pub max_chars: usize,

    /// Characters of trailing context repeated at the start of the next chunk
    #[arg(long, default_value_t = DEFAULT_OVERLAP_CHARS)]
    pub overlap: usize,
}

#[derive(Debug, Serialize)]
pub struct SplitOutput {
    pub success: bool,
    pub out: PathBuf,
    pub sources: usize,
    pub chunks: usize,
}

impl CommandOutput for SplitOutput {
    fn to_human(&self) -> String {
        format!(
            "Wrote {} chunks from {} source files to {}",
            self.chunks,
            self.sources,
            self.out.display()
        )
    }
}

pub fn execute(args: SplitArgs, json_mode: bool) -> Result<()> {
    let splitter = TextSplitter::new(args.max_chars, args.overlap).map_err(PipelineError::from)?;
    let chunks = splitter
        .split_dir(&args.dir, args.topic.as_deref())
        .map_err(PipelineError::from)
        .with_context(|| format!("Failed to split {}", args.dir.display()))?;

    write_file(&args.out, &chunks)
        .map_err(PipelineError::from)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    let sources: BTreeSet<&str> = chunks.iter().filter_map(|c| c.source()).collect();
    let output_data = SplitOutput {
        success: true,
        sources: sources.len(),
        chunks: chunks.len(),
        out: args.out,
    };

    output(&output_data, json_mode);
    Ok(())
}
