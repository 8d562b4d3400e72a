//! Implementation of the `pounce status` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::progress::create_spinner;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::status::{self, ProviderStatus, StatusReport};

#[derive(Args, Debug)]
pub struct StatusArgs {}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub success: bool,
    #[serde(flatten)]
    pub report: StatusReport,
}

fn mark(ok: bool) -> console::StyledObject<&'static str> {
    if ok {
        console::style("✓").green()
    } else {
        console::style("✗").red()
    }
}

fn provider_line(label: &str, status: &ProviderStatus) -> String {
    let mut line = format!(
        "{} {label:<11}{} {}",
        mark(status.available),
        status.provider,
        status.target
    );
    if let Some(detail) = &status.detail {
        line.push_str(&format!(": {detail}"));
    }
    line
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut lines = vec![format!("Mode: {}", report.mode.as_str())];

        lines.push("Credentials:".to_string());
        for credential in &report.credentials {
            let state = if credential.set { "set" } else { "not set" };
            lines.push(format!("  {} {} ({state})", mark(credential.set), credential.env));
        }

        lines.push(provider_line("Embedding", &report.embedding));
        lines.push(provider_line("Index", &report.index));
        if let Some(details) = &report.index_details {
            lines.push(format!(
                "  {} dimensions, {}, {}",
                details.dimension,
                details.metric.map_or_else(|| "unknown metric".to_string(), |m| m.to_string()),
                if details.ready { "ready" } else { "not ready" }
            ));
        }
        lines.push(provider_line("Generation", &report.generation));
        lines.join("\n")
    }
}

pub async fn execute(_args: StatusArgs, config: &Config, offline: bool, json_mode: bool) -> Result<()> {
    let spinner = create_spinner("Checking providers", json_mode);
    let report = status::check(config, offline).await;
    spinner.finish_and_clear();

    let output_data = StatusOutput {
        success: report.healthy(),
        report,
    };

    output(&output_data, json_mode);
    Ok(())
}
