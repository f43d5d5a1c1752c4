//! Context command implementation.

use super::{load_retriever, preflight};
use crate::cli::preflight::Operation;
use crate::cli::{Output, RetrievalArgs};
use crate::config::Settings;
use crate::retrieval::SearchRequest;
use anyhow::Result;

/// Run the context command: show exactly what an answer would be grounded on.
pub async fn run_context(query: &str, retrieval: &RetrievalArgs, settings: Settings) -> Result<()> {
    preflight(Operation::Search)?;

    let retriever = load_retriever(&settings)?;
    let retrieval = retrieval.apply(&settings.retrieval);

    Output::kv("field", &retrieval.ranking_field.to_string());
    Output::kv("mode", &retrieval.return_mode.to_string());

    let spinner = Output::spinner("Retrieving...");
    let context = retriever
        .search(&SearchRequest::from_settings(query, &retrieval))
        .await;
    spinner.finish_and_clear();

    let context = match context {
        Ok(context) => context,
        Err(e) => {
            Output::error(&format!("Retrieval failed: {}", e));
            return Err(e.into());
        }
    };

    if context.is_empty() {
        Output::warning("Nothing relevant enough to include.");
        return Ok(());
    }

    Output::header("Context");
    println!("{}", context.text());

    Output::header("Sources");
    for (i, source) in context.sources.iter().enumerate() {
        Output::source(i + 1, source);
    }

    Ok(())
}
