//! Implementation of the `pounce setup` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::progress::{create_spinner, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Metric, Provisioned};
use crate::infrastructure::backends::{Backends, Mode};
use crate::infrastructure::setup::{create_config_file, SetupPaths};

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Overwrite an existing .pounce/config.yaml with the defaults
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct SetupOutput {
    pub success: bool,
    pub config_path: PathBuf,
    pub config_written: bool,
    pub mode: Mode,
    pub index: String,
    pub dimension: usize,
    pub metric: Metric,
    pub status: Provisioned,
}

impl CommandOutput for SetupOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.config_written {
            lines.push(format!("Wrote default configuration to {}", self.config_path.display()));
        } else {
            lines.push(format!("Using existing configuration at {}", self.config_path.display()));
        }

        let verb = match self.status {
            Provisioned::Created => "Created",
            Provisioned::AlreadyExists => "Found existing",
        };
        lines.push(format!(
            "{verb} index '{}' ({} dimensions, {})",
            self.index, self.dimension, self.metric
        ));
        if self.mode == Mode::Offline {
            lines.push("Offline mode: the index lives in memory and is not persisted.".to_string());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: SetupArgs, config: &Config, offline: bool, json_mode: bool) -> Result<()> {
    let paths = SetupPaths::new()?;
    let config_written = create_config_file(&paths, args.force)?;

    let backends = Backends::connect(config, offline)?;
    let spec = backends.index_spec();

    let spinner = create_spinner(format!("Ensuring index '{}'", spec.name), json_mode);
    let status = match backends.provisioner().ensure_index(&spec).await {
        Ok(status) => status,
        Err(e) => {
            spinner.finish_error("index setup failed");
            return Err(e).with_context(|| format!("Failed to ensure index '{}'", spec.name));
        }
    };
    spinner.finish_success(format!("index '{}' ready", spec.name));

    let output_data = SetupOutput {
        success: true,
        config_path: paths.config_file,
        config_written,
        mode: backends.mode(),
        index: spec.name,
        dimension: spec.dimension,
        metric: spec.metric,
        status,
    };

    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_output_human_and_json() {
        let output_data = SetupOutput {
            success: true,
            config_path: PathBuf::from(".pounce/config.yaml"),
            config_written: false,
            mode: Mode::Hosted,
            index: "pounce".to_string(),
            dimension: 1536,
            metric: Metric::Cosine,
            status: Provisioned::AlreadyExists,
        };

        let human = output_data.to_human();
        assert!(human.contains("Using existing configuration"));
        assert!(human.contains("Found existing index 'pounce' (1536 dimensions, cosine)"));

        let json = output_data.to_json();
        assert_eq!(json["status"], "already_exists");
        assert_eq!(json["mode"], "hosted");
        assert_eq!(json["metric"], "cosine");
    }
}
