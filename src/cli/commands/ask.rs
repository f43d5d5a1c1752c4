//! Ask command implementation.

use super::{preflight, session};
use crate::cli::preflight::Operation;
use crate::cli::{Output, RetrievalArgs};
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    retrieval: &RetrievalArgs,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight(Operation::Ask)?;

    let mut session = session(&settings, model.as_deref())?;
    let assistant = session.assistant(&retrieval.apply(&settings.retrieval))?;

    let spinner = Output::spinner("Brewing an answer...");
    let answer = assistant.ask(question).await;
    spinner.finish_and_clear();

    match answer {
        Ok(answer) => {
            println!("\n{}\n", answer.text);

            if !answer.sources.is_empty() {
                Output::header("Sources");
                for (i, source) in answer.sources.iter().enumerate() {
                    Output::source(i + 1, source);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
