//! CLI command implementations.

mod ask;
mod cache;
mod chat;
mod config;
mod context;
mod embed;
mod guide;
mod improve;
mod search;
mod tags;

pub use ask::run_ask;
pub use cache::run_cache;
pub use chat::run_chat;
pub use config::run_config;
pub use context::run_context;
pub use embed::run_embed;
pub use guide::run_guide;
pub use improve::run_improve;
pub use search::run_search;
pub use tags::{run_browse, run_tags};

use crate::assistant::{Assistant, OpenAIGenerator};
use crate::cache::ResponseCache;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::corpus::DirectoryLoader;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::retrieval::Retriever;
use crate::session::Session;
use std::sync::Arc;
use tracing::warn;

/// Run pre-flight checks, reporting failures to the user.
fn preflight(operation: Operation) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(operation) {
        Output::error(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

fn embedder(settings: &Settings) -> anyhow::Result<Arc<dyn Embedder>> {
    Ok(Arc::new(OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    )?))
}

/// Load the corpus from the documents directory and build every index.
fn load_retriever(settings: &Settings) -> anyhow::Result<Retriever> {
    let loader = DirectoryLoader::new(settings.documents_dir());
    let spinner = Output::spinner("Loading knowledge base...");
    let retriever = Retriever::load(&loader, embedder(settings)?);
    spinner.finish_and_clear();
    Ok(retriever?)
}

/// Open the response cache if enabled. Failure disables caching.
fn open_cache(settings: &Settings) -> Option<Arc<ResponseCache>> {
    if !settings.cache.enabled {
        return None;
    }
    match ResponseCache::open(&settings.cache_path(), settings.cache.ttl_days) {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            warn!("Response cache unavailable: {}", e);
            None
        }
    }
}

fn prompts(settings: &Settings) -> anyhow::Result<Prompts> {
    Ok(Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?)
}

/// Assistant for operations that need no knowledge base.
fn plain_assistant(settings: &Settings) -> anyhow::Result<Assistant> {
    let generator = Arc::new(OpenAIGenerator::new(&settings.generation.model)?);
    let mut assistant = Assistant::new(generator, settings.generation.clone())
        .with_prompts(prompts(settings)?)
        .with_retrieval(settings.retrieval.clone());
    if let Some(cache) = open_cache(settings) {
        assistant = assistant.with_cache(cache);
    }
    Ok(assistant)
}

/// Build a session over the configured corpus, generator and cache.
fn session(settings: &Settings, model: Option<&str>) -> anyhow::Result<Session> {
    let prompts = prompts(settings)?;

    let mut generation = settings.generation.clone();
    if let Some(model) = model {
        generation.model = model.to_string();
    }

    let generator = Arc::new(OpenAIGenerator::new(&generation.model)?);
    let loader = Arc::new(DirectoryLoader::new(settings.documents_dir()));

    let mut session =
        Session::new(loader, embedder(settings)?, generator, generation).with_prompts(prompts);
    if let Some(cache) = open_cache(settings) {
        session = session.with_cache(cache);
    }

    Ok(session)
}
