//! Pounce CLI entry point.

use anyhow::Context;
use clap::Parser;

use pounce::cli::commands::{self, load_config};
use pounce::cli::{handle_error, Cli, Commands};
use pounce::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _logger = LoggerImpl::init(&config.logging).context("Failed to initialize logging")?;

    let (json, offline) = (cli.json, cli.offline);
    match cli.command {
        Commands::Setup(args) => commands::setup::execute(args, &config, offline, json).await,
        Commands::Index(args) => commands::index::execute(args, &config, offline, json).await,
        Commands::Split(args) => commands::split::execute(args, json),
        Commands::Search(args) => commands::search::execute(args, &config, offline, json).await,
        Commands::Ask(args) => commands::ask::execute(args, &config, offline, json).await,
        Commands::Status(args) => commands::status::execute(args, &config, offline, json).await,
    }
}
