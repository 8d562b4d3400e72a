//! Implementation of the `pounce ask` command.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::prepare_offline_index;
use crate::cli::output::progress::create_spinner;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Answer, Config};
use crate::infrastructure::backends::{chat_model, Backends};
use crate::services::Advisor;

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer; omit to start an interactive session
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskOutput {
    #[serde(flatten)]
    pub answer: Answer,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.answer.text.clone()];

        if self.answer.has_context {
            lines.push(String::new());
            lines.push(style("Sources:").bold().to_string());
            for (rank, passage) in self.answer.sources.iter().enumerate() {
                lines.push(format!(
                    "  [{}] {} ({:.3}) {}",
                    rank + 1,
                    passage.id,
                    passage.score,
                    style(truncate(passage.source.as_deref().unwrap_or(""), 60)).dim()
                ));
            }
        } else {
            lines.push(String::new());
            lines.push(style("(no matching passages were found)").dim().to_string());
        }

        lines.join("\n")
    }
}

pub async fn execute(args: AskArgs, config: &Config, offline: bool, json_mode: bool) -> Result<()> {
    let model = chat_model(config)?;
    let backends = Backends::connect(config, offline)?;
    prepare_offline_index(&backends, config, json_mode).await?;
    let advisor = backends.advisor(model).await?;

    match args.question {
        Some(question) => {
            let answer = ask_once(&advisor, &question, json_mode).await?;
            output(&AskOutput { answer }, json_mode);
            Ok(())
        }
        None => interactive(&advisor, config, json_mode).await,
    }
}

async fn ask_once(advisor: &Advisor, question: &str, json_mode: bool) -> Result<Answer> {
    let spinner = create_spinner("Thinking", json_mode);
    let answer = advisor.ask(question).await.context("Failed to answer question");
    spinner.finish_and_clear();
    answer
}

/// Read questions from stdin until EOF or an exit word; a failed question is
/// reported and the session continues
async fn interactive(advisor: &Advisor, config: &Config, json_mode: bool) -> Result<()> {
    if !json_mode {
        eprintln!(
            "{} Ask about {}. Type {} to leave.",
            style("Pounce").cyan().bold(),
            config.generation.institution,
            style("exit").bold()
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !json_mode {
            eprint!("{} ", style("you>").green().bold());
            std::io::stderr().flush().ok();
        }

        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }

        match ask_once(advisor, question, json_mode).await {
            Ok(answer) => output(&AskOutput { answer }, json_mode),
            Err(e) => eprintln!("{} {e:#}", style("Error:").red().bold()),
        }
    }

    Ok(())
}
