//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use crate::domain::errors::PipelineError;
use commands::{
    ask::AskArgs, index::IndexArgs, search::SearchArgs, setup::SetupArgs, split::SplitArgs,
    status::StatusArgs,
};

#[derive(Parser, Debug)]
#[command(name = "pounce")]
#[command(about = "Pounce - retrieval-augmented academic advising assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .pounce/config.yaml and .pounce/local.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use the in-process index and hashing embedder instead of hosted services
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default config and create the vector index if it is missing
    Setup(SetupArgs),

    /// Embed the chunk corpus and upsert it into the index
    Index(IndexArgs),

    /// Split raw text files into a chunk file
    Split(SplitArgs),

    /// Show the passages retrieved for a question
    Search(SearchArgs),

    /// Answer a question, or start an interactive session when none is given
    Ask(AskArgs),

    /// Check credentials, provider reachability and index readiness
    Status(StatusArgs),
}

/// Print `err` in the requested format and exit with status 1
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PipelineError>())
        .map_or("error", PipelineError::kind);

    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = json!({
            "success": false,
            "kind": kind,
            "error": err.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }

    std::process::exit(1);
}
