//! Answer generation on top of retrieval.
//!
//! The [`Assistant`] answers questions with retrieved context, writes brewing
//! guides and diagnoses brews. Responses are cached per operation, arguments
//! and retrieval settings when a [`ResponseCache`] is attached.

mod brew;
mod generator;

pub use brew::{BrewReport, BREWING_METHODS};
pub use generator::{CompletionRequest, Generator, OpenAIGenerator};

use crate::cache::ResponseCache;
use crate::config::{GenerationSettings, Prompts, RetrievalSettings};
use crate::error::{GuaxinimError, Result};
use crate::retrieval::{RetrievalContext, Retriever, SearchRequest, Source};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// An answer with the sources its context came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Source>,
}

impl Answer {
    /// Format the answer for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.text.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!("\n{}\n  {}", source.title, source.url));
            }
        }

        output
    }
}

/// Coffee assistant: retrieval plus generation.
pub struct Assistant {
    retriever: Option<Arc<Retriever>>,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    retrieval: RetrievalSettings,
    generation: GenerationSettings,
    cache: Option<Arc<ResponseCache>>,
}

impl Assistant {
    /// An assistant without a knowledge base; answers use no retrieved context.
    pub fn new(generator: Arc<dyn Generator>, generation: GenerationSettings) -> Self {
        Self {
            retriever: None,
            generator,
            prompts: Prompts::default(),
            retrieval: RetrievalSettings::default(),
            generation,
            cache: None,
        }
    }

    pub fn with_retriever(mut self, retriever: Arc<Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalSettings) -> Self {
        self.retrieval = retrieval;
        self
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn retrieval(&self) -> &RetrievalSettings {
        &self.retrieval
    }

    pub fn retriever(&self) -> Option<&Arc<Retriever>> {
        self.retriever.as_ref()
    }

    /// Retrieve context for a query. Without a knowledge base this is empty.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalContext> {
        match &self.retriever {
            Some(retriever) => {
                let request = SearchRequest::from_settings(query, &self.retrieval);
                retriever.search(&request).await
            }
            None => {
                debug!("No knowledge base configured, skipping retrieval");
                Ok(RetrievalContext::default())
            }
        }
    }

    /// Serve from cache when possible, otherwise compute and store.
    async fn cached<T, F, Fut>(&self, operation: &str, args: serde_json::Value, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(cache) = &self.cache else {
            return compute().await;
        };

        let key = ResponseCache::key(
            operation,
            &serde_json::json!({ "args": args, "retrieval": self.retrieval }),
        );

        if let Some(hit) = cache.get_json::<T>(&key) {
            info!("Using cached response for {}", operation);
            return Ok(hit);
        }

        let value = compute().await?;
        cache.put_json(&key, &value);
        debug!("Cached response for {}", operation);
        Ok(value)
    }

    async fn complete(&self, system: &str, user: String, max_tokens: u32) -> Result<String> {
        let request = CompletionRequest {
            system: system.to_string(),
            user,
            temperature: self.generation.temperature,
            max_tokens,
        };
        self.generator.complete(&request).await
    }

    /// Answer a question using retrieved context.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(GuaxinimError::InvalidInput("Question is empty".to_string()));
        }

        self.cached("ask", serde_json::json!({ "question": question }), || async move {
            let context = self.retrieve(question).await?;

            let mut vars = HashMap::new();
            vars.insert("question".to_string(), question.to_string());

            let template = if context.is_empty() {
                &self.prompts.ask.user_without_context
            } else {
                vars.insert("context".to_string(), context.text());
                &self.prompts.ask.user
            };
            let user = self.prompts.render_with_custom(template, &vars);

            let text = self
                .complete(&self.prompts.ask.system, user, self.generation.max_tokens)
                .await?;

            info!("Answered with {} sources", context.sources.len());

            Ok::<_, GuaxinimError>(Answer {
                text,
                sources: context.sources,
            })
        })
        .await
    }

    /// Step-by-step guide for a brewing method.
    #[instrument(skip(self))]
    pub async fn brewing_guide(&self, method: &str) -> Result<String> {
        let method = method.trim();
        if method.is_empty() {
            return Err(GuaxinimError::InvalidInput("Brewing method is required".to_string()));
        }

        self.cached("guide", serde_json::json!({ "method": method }), || async move {
            let mut vars = HashMap::new();
            vars.insert("method".to_string(), method.to_string());
            let user = self.prompts.render_with_custom(&self.prompts.guide.user, &vars);

            self.complete(&self.prompts.guide.system, user, self.generation.guide_max_tokens)
                .await
        })
        .await
    }

    /// Suggestions for fixing a brew.
    #[instrument(skip_all, fields(issue = %report.issue, method = %report.brewing_method))]
    pub async fn improve(&self, report: &BrewReport) -> Result<String> {
        report.validate()?;

        let args = serde_json::to_value(report)?;
        self.cached("improve", args, || async move {
            let mut vars = HashMap::new();
            vars.insert("parameters".to_string(), report.parameters().join("\n"));
            let user = self.prompts.render_with_custom(&self.prompts.improve.user, &vars);

            self.complete(&self.prompts.improve.system, user, self.generation.max_tokens)
                .await
        })
        .await
    }
}
