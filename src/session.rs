//! Session-scoped assistant management.
//!
//! Building an [`Assistant`] loads the corpus and builds every index, so a
//! session keeps the last one and only rebuilds when the retrieval settings
//! it was built with change.

use crate::assistant::{Assistant, Generator};
use crate::cache::ResponseCache;
use crate::config::{GenerationSettings, Prompts, RetrievalSettings};
use crate::corpus::CorpusLoader;
use crate::embedding::Embedder;
use crate::error::{GuaxinimError, Result};
use crate::retrieval::Retriever;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the collaborators needed to build an assistant and caches the result.
pub struct Session {
    loader: Arc<dyn CorpusLoader>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    generation: GenerationSettings,
    cache: Option<Arc<ResponseCache>>,
    current: Option<(RetrievalSettings, Arc<Assistant>)>,
    builds: usize,
}

impl Session {
    pub fn new(
        loader: Arc<dyn CorpusLoader>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        generation: GenerationSettings,
    ) -> Self {
        Self {
            loader,
            embedder,
            generator,
            prompts: Prompts::default(),
            generation,
            cache: None,
            current: None,
            builds: 0,
        }
    }

    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Number of assistants built so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    /// Retrieval settings of the current assistant, if one was built.
    pub fn settings(&self) -> Option<&RetrievalSettings> {
        self.current.as_ref().map(|(settings, _)| settings)
    }

    /// Assistant for `settings`, rebuilt only if the settings changed.
    pub fn assistant(&mut self, settings: &RetrievalSettings) -> Result<Arc<Assistant>> {
        if let Some((built_with, assistant)) = &self.current {
            if built_with == settings {
                return Ok(assistant.clone());
            }
            info!("Retrieval settings changed, rebuilding assistant");
        }

        let assistant = Arc::new(self.build(settings)?);
        self.current = Some((settings.clone(), assistant.clone()));
        self.builds += 1;
        Ok(assistant)
    }

    fn build(&self, settings: &RetrievalSettings) -> Result<Assistant> {
        let mut assistant = Assistant::new(self.generator.clone(), self.generation.clone())
            .with_prompts(self.prompts.clone())
            .with_retrieval(settings.clone());

        if let Some(cache) = &self.cache {
            assistant = assistant.with_cache(cache.clone());
        }

        match Retriever::load(self.loader.as_ref(), self.embedder.clone()) {
            Ok(retriever) => Ok(assistant.with_retriever(Arc::new(retriever))),
            Err(e @ GuaxinimError::CorpusEmpty { .. }) => {
                warn!("{}; answering without a knowledge base", e);
                Ok(assistant)
            }
            Err(e) => Err(e),
        }
    }
}
