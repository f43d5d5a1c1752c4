//! Search command implementation.

use super::{load_retriever, preflight};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::retrieval::{Retriever, SearchResult};
use anyhow::Result;

/// Raw matches for each field.
async fn search_all(
    retriever: &Retriever,
    query: &str,
    limit: usize,
) -> crate::Result<(Vec<SearchResult>, Vec<SearchResult>, Vec<SearchResult>)> {
    Ok((
        retriever.search_chunks(query, limit).await?,
        retriever.search_titles(query, limit).await?,
        retriever.search_summaries(query, limit).await?,
    ))
}

/// Run the search command: raw chunk, title and summary matches, no filtering.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    preflight(Operation::Search)?;

    let retriever = load_retriever(&settings)?;

    let spinner = Output::spinner("Searching...");
    let results = search_all(&retriever, query, limit).await;
    spinner.finish_and_clear();

    let (chunks, titles, summaries) = match results {
        Ok(results) => results,
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    };

    if chunks.is_empty() && titles.is_empty() && summaries.is_empty() {
        Output::warning("No results found. Run 'guaxinim embed' to build the knowledge base.");
        return Ok(());
    }

    Output::header("Chunk matches");
    for result in &chunks {
        Output::search_result(result);
    }

    Output::header("Title matches");
    for result in &titles {
        Output::search_result(result);
    }

    Output::header("Summary matches");
    for result in &summaries {
        Output::search_result(result);
    }

    Ok(())
}
