//! Context assembly: turns ranked candidates into prompt context and citations.

use super::{Candidates, ReturnMode, SearchResult};
use crate::corpus::DocumentStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Candidates must score strictly above this to enter the context.
pub const RELEVANCE_THRESHOLD: f32 = 0.5;

/// Provenance of a piece of context, shown to the user as a citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Source {
    fn of(result: &SearchResult) -> Self {
        Self {
            title: result.title.clone(),
            url: result.source.clone(),
            tags: result.tags.clone(),
        }
    }
}

/// Assembled context blocks plus their sources. No two sources share a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalContext {
    pub parts: Vec<String>,
    pub sources: Vec<Source>,
}

impl RetrievalContext {
    /// Context blocks joined for inclusion in a prompt.
    pub fn text(&self) -> String {
        self.parts.join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Register a source unless its URL is already present.
    fn add_source(&mut self, source: Source) -> bool {
        if self.sources.iter().any(|s| s.url == source.url) {
            return false;
        }
        self.sources.push(source);
        true
    }

    fn has_url(&self, url: &str) -> bool {
        self.sources.iter().any(|s| s.url == url)
    }
}

/// Filters, deduplicates, formats and caps retrieval candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    fn relevant<'a>(&self, results: &'a [SearchResult]) -> impl Iterator<Item = &'a SearchResult> {
        results.iter().filter(|r| r.similarity_score > RELEVANCE_THRESHOLD)
    }

    pub fn assemble(
        &self,
        store: &DocumentStore,
        candidates: &Candidates,
        mode: ReturnMode,
        max_whole_files: usize,
    ) -> RetrievalContext {
        let context = match mode {
            ReturnMode::Chunks => self.assemble_chunks(candidates),
            ReturnMode::WholeFile => self.assemble_whole_files(store, candidates, max_whole_files),
        };

        debug!(
            "Assembled {} context blocks from {} sources",
            context.parts.len(),
            context.sources.len()
        );

        context
    }

    fn assemble_chunks(&self, candidates: &Candidates) -> RetrievalContext {
        let mut context = RetrievalContext::default();

        for result in self.relevant(&candidates.primary) {
            context.parts.push(format_chunk_block(result));
            context.add_source(Source::of(result));
        }

        for result in self.relevant(&candidates.titles) {
            if context.has_url(&result.source) {
                continue;
            }
            context.parts.push(format_additional_block(result));
            context.add_source(Source::of(result));
        }

        context
    }

    fn assemble_whole_files(
        &self,
        store: &DocumentStore,
        candidates: &Candidates,
        max_whole_files: usize,
    ) -> RetrievalContext {
        let mut context = RetrievalContext::default();
        let mut titles: HashSet<&str> = HashSet::new();

        for result in self.relevant(&candidates.primary) {
            if titles.len() >= max_whole_files {
                break;
            }
            if !titles.insert(result.title.as_str()) {
                continue;
            }
            let Some(doc) = store.get(result.document) else {
                continue;
            };

            context
                .parts
                .push(format!("From {}:\n{}\nSource: {}", doc.title, doc.text(), doc.source));
            context.add_source(Source::of(result));
        }

        context
    }
}

fn format_chunk_block(result: &SearchResult) -> String {
    let text = result
        .matched_text
        .as_deref()
        .or(result.summary.as_deref())
        .unwrap_or_default();

    let mut block = format!("From {}:\n{}", result.title, text);
    if !result.tags.is_empty() {
        block.push_str(&format!("\nTags: {}", result.tags.join(", ")));
    }
    block.push_str(&format!("\nSource: {}", result.source));
    block
}

fn format_additional_block(result: &SearchResult) -> String {
    format!(
        "Additional relevant article: {}\nSource: {}",
        result.title, result.source
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{DocumentStore, MemoryLoader};
    use crate::embedding::Embedder;
    use crate::retrieval::{RankingField, Retriever, SearchRequest};
    use crate::testing::{corpus, FakeEmbedder};
    use std::sync::Arc;

    fn retriever() -> Retriever {
        let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::for_corpus());
        Retriever::load(&MemoryLoader::new(corpus()), embedder).unwrap()
    }

    fn result(document: usize, title: &str, url: &str, score: f32) -> SearchResult {
        SearchResult {
            document,
            title: title.to_string(),
            source: url.to_string(),
            matched_text: Some(format!("text from {}", title)),
            summary: None,
            tags: vec![],
            similarity_score: score,
        }
    }

    #[tokio::test]
    async fn test_chunk_context_for_close_query() {
        let retriever = retriever();
        let context = retriever.search(&SearchRequest::new("bloom")).await.unwrap();

        // Two chunks of the same document above threshold, one source.
        assert_eq!(context.parts.len(), 2);
        assert_eq!(
            context.parts[0],
            "From Pour Over Basics:\nBloom the grounds for 30 seconds.\nTags: brewing, guide\nSource: https://coffee.example/pourover"
        );
        assert_eq!(context.sources.len(), 1);
        assert_eq!(context.sources[0].url, "https://coffee.example/pourover");
        assert_eq!(context.sources[0].tags, vec!["brewing", "guide"]);
    }

    #[tokio::test]
    async fn test_title_match_adds_new_source() {
        let retriever = retriever();
        let request = SearchRequest::new("espresso with dessert").with_k(1);
        let context = retriever.search(&request).await.unwrap();

        assert_eq!(context.parts.len(), 2);
        assert!(context.parts[0].starts_with("From Coffee and Desserts:"));
        assert_eq!(
            context.parts[1],
            "Additional relevant article: Espresso Dialing\nSource: https://coffee.example/espresso"
        );
        let titles: Vec<&str> = context.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Coffee and Desserts", "Espresso Dialing"]);
    }

    #[tokio::test]
    async fn test_whole_file_context_uses_full_text() {
        let retriever = retriever();
        let request = SearchRequest::new("bloom").with_mode(ReturnMode::WholeFile);
        let context = retriever.search(&request).await.unwrap();

        assert_eq!(
            context.parts,
            vec!["From Pour Over Basics:\nThe complete pour over guide.\nSource: https://coffee.example/pourover"]
        );
        assert_eq!(context.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_whole_file_cap_keeps_higher_ranked() {
        let retriever = retriever();
        let request = SearchRequest::new("espresso with dessert")
            .with_field(RankingField::Summary)
            .with_mode(ReturnMode::WholeFile)
            .with_k(2);

        let context = retriever.search(&request.clone().with_max_whole_files(2)).await.unwrap();
        assert_eq!(context.sources.len(), 2);

        let context = retriever.search(&request.with_max_whole_files(1)).await.unwrap();
        assert_eq!(context.sources.len(), 1);
        assert_eq!(context.sources[0].title, "Coffee and Desserts");
        assert_eq!(
            context.parts[0],
            "From Coffee and Desserts:\nDark roasts pair with chocolate.\nSource: https://coffee.example/desserts"
        );
    }

    #[test]
    fn test_sources_unique_by_url() {
        let store = DocumentStore::from_documents(corpus(), "test").unwrap();
        let candidates = Candidates {
            primary: vec![
                result(0, "A", "https://a", 0.9),
                result(1, "B", "https://b", 0.8),
                result(0, "A again", "https://a", 0.7),
            ],
            titles: vec![
                result(1, "B", "https://b", 0.9),
                result(2, "C", "https://c", 0.6),
                result(2, "C", "https://c", 0.6),
            ],
        };

        let context = ContextAssembler::new().assemble(&store, &candidates, ReturnMode::Chunks, 2);
        let urls: Vec<&str> = context.sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://b", "https://c"]);
        // Three chunk blocks plus one additional article.
        assert_eq!(context.parts.len(), 4);
    }

    #[test]
    fn test_threshold_is_strict() {
        let store = DocumentStore::from_documents(corpus(), "test").unwrap();
        let candidates = Candidates {
            primary: vec![
                result(0, "A", "https://a", 0.5),
                result(1, "B", "https://b", 0.51),
            ],
            titles: vec![result(2, "C", "https://c", 0.5)],
        };

        let context = ContextAssembler::new().assemble(&store, &candidates, ReturnMode::Chunks, 2);
        assert_eq!(context.sources.len(), 1);
        assert_eq!(context.sources[0].url, "https://b");
    }

    #[test]
    fn test_whole_file_dedups_by_title() {
        let store = DocumentStore::from_documents(corpus(), "test").unwrap();
        let candidates = Candidates {
            primary: vec![
                result(0, "Pour Over Basics", "https://coffee.example/pourover", 0.9),
                result(0, "Pour Over Basics", "https://coffee.example/pourover", 0.8),
                result(1, "Espresso Dialing", "https://coffee.example/espresso", 0.7),
                result(2, "Coffee and Desserts", "https://coffee.example/desserts", 0.6),
            ],
            titles: vec![],
        };

        let context =
            ContextAssembler::new().assemble(&store, &candidates, ReturnMode::WholeFile, 2);
        let titles: Vec<&str> = context.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Pour Over Basics", "Espresso Dialing"]);
        assert_eq!(context.parts.len(), 2);
        assert!(context.parts[1].contains("Grind finer if the shot runs fast."));
    }

    #[test]
    fn test_nothing_relevant_gives_empty_context() {
        let store = DocumentStore::from_documents(corpus(), "test").unwrap();
        let candidates = Candidates {
            primary: vec![result(0, "A", "https://a", 0.1)],
            titles: vec![],
        };

        for mode in [ReturnMode::Chunks, ReturnMode::WholeFile] {
            let context = ContextAssembler::new().assemble(&store, &candidates, mode, 2);
            assert!(context.is_empty());
            assert!(context.sources.is_empty());
            assert_eq!(context.text(), "");
        }
    }
}
