//! Improve command implementation.

use super::{plain_assistant, preflight};
use crate::assistant::BrewReport;
use crate::cli::preflight::Operation;
use crate::cli::{ImproveArgs, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the improve command.
pub async fn run_improve(args: &ImproveArgs, settings: Settings) -> Result<()> {
    let report = BrewReport::from(args);
    report.validate()?;

    preflight(Operation::Ask)?;

    let assistant = plain_assistant(&settings)?;

    Output::header("Your brew");
    for line in report.parameters() {
        Output::list_item(&line);
    }

    let spinner = Output::spinner("Analyzing...");
    let suggestions = assistant.improve(&report).await;
    spinner.finish_and_clear();

    match suggestions {
        Ok(suggestions) => println!("\n{}\n", suggestions),
        Err(e) => {
            Output::error(&format!("Failed to analyze brew: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
