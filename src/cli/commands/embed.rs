//! Embed command implementation.

use super::{embedder, preflight};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::ingest::EmbeddingsProcessor;
use anyhow::Result;

/// Run the embed command: raw records in, document records out.
pub async fn run_embed(input: Option<&str>, output: Option<&str>, settings: Settings) -> Result<()> {
    preflight(Operation::Embed)?;

    let input = input
        .map(Settings::expand_path)
        .unwrap_or_else(|| settings.raw_dir());
    let output = output
        .map(Settings::expand_path)
        .unwrap_or_else(|| settings.documents_dir());

    Output::kv("input", &input.display().to_string());
    Output::kv("output", &output.display().to_string());

    let processor = EmbeddingsProcessor::new(embedder(&settings)?);

    let spinner = Output::spinner("Embedding records...");
    let summary = processor.process_directory(&input, &output).await;
    spinner.finish_and_clear();

    let summary = summary?;
    if summary.processed == 0 && summary.failed == 0 {
        Output::warning("No raw records found.");
        return Ok(());
    }

    Output::success(&format!("Embedded {} records", summary.processed));
    if summary.failed > 0 {
        Output::warning(&format!(
            "{} records failed; run with -v for details",
            summary.failed
        ));
    }

    Ok(())
}
