//! Tag listing and browsing.

use super::preflight;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::{DirectoryLoader, DocumentStore};
use crate::index::TagIndex;
use anyhow::Result;
use console::style;

fn load_store(settings: &Settings) -> Result<DocumentStore> {
    preflight(Operation::Browse)?;
    Ok(DocumentStore::load(&DirectoryLoader::new(settings.documents_dir()))?)
}

/// Run the tags command.
pub fn run_tags(limit: Option<usize>, settings: Settings) -> Result<()> {
    let store = load_store(&settings)?;
    let tags = TagIndex::build(&store).tags_with_frequency();

    if tags.is_empty() {
        Output::warning("No tagged documents.");
        return Ok(());
    }

    Output::header(&format!("Tags ({} documents)", store.len()));
    for (tag, count) in tags.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("  {:>4}  {}", style(count).dim(), tag);
    }

    Ok(())
}

/// Run the browse command.
pub fn run_browse(tag: &str, limit: usize, settings: Settings) -> Result<()> {
    let store = load_store(&settings)?;
    let index = TagIndex::build(&store);
    let documents = index.documents_by_tag(&store, tag, limit);

    if documents.is_empty() {
        Output::warning(&format!("No documents tagged '{}'.", tag));
        return Ok(());
    }

    Output::header(&format!("Tagged '{}'", tag));
    for doc in documents {
        println!("\n  {}", style(&doc.title).bold());
        if !doc.summary.is_empty() {
            println!("  {}", doc.summary);
        }
        println!("  {}", style(&doc.source).dim());
    }

    Ok(())
}
