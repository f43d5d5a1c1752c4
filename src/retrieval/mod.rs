//! Retrieval over the document corpus.
//!
//! A [`Retriever`] owns the document store and the three field indices. For
//! each query it embeds the text once, runs one to two index searches
//! depending on the [`RankingField`], and hands the candidates to the
//! [`ContextAssembler`].

pub mod context;

pub use context::{ContextAssembler, RetrievalContext, Source, RELEVANCE_THRESHOLD};

pub use crate::config::{RankingField, ReturnMode};

use crate::config::RetrievalSettings;
use crate::corpus::{CorpusLoader, Document, DocumentStore, Field};
use crate::embedding::Embedder;
use crate::error::{GuaxinimError, Result};
use crate::index::{Neighbor, TagIndex, VectorIndex};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Title matches fetched alongside chunk matches.
const TITLE_MATCHES: usize = 2;

/// A single match, carrying its document's metadata whichever field matched.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Position of the matched document in the store.
    pub document: usize,
    pub title: String,
    pub source: String,
    /// Chunk text, for chunk matches and summary-expanded chunks.
    pub matched_text: Option<String>,
    /// Document summary, for summary matches.
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub similarity_score: f32,
}

/// Ranked candidates for one query.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    /// Primary matches in rank order.
    pub primary: Vec<SearchResult>,
    /// Supplementary whole-document title matches (chunks ranking only).
    pub titles: Vec<SearchResult>,
}

/// A fully specified retrieval query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub field: RankingField,
    pub mode: ReturnMode,
    pub k: usize,
    pub max_whole_files: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self::from_settings(query, &RetrievalSettings::default())
    }

    pub fn from_settings(query: impl Into<String>, settings: &RetrievalSettings) -> Self {
        Self {
            query: query.into(),
            field: settings.ranking_field,
            mode: settings.return_mode,
            k: settings.k,
            max_whole_files: settings.max_whole_files,
        }
    }

    pub fn with_field(mut self, field: RankingField) -> Self {
        self.field = field;
        self
    }

    pub fn with_mode(mut self, mode: ReturnMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_max_whole_files(mut self, max_whole_files: usize) -> Self {
        self.max_whole_files = max_whole_files;
        self
    }
}

/// Document store plus chunk, title, summary and tag indices.
///
/// Read-only after construction; safe to share across concurrent queries.
pub struct Retriever {
    store: Arc<DocumentStore>,
    chunks: VectorIndex,
    titles: VectorIndex,
    summaries: VectorIndex,
    tags: TagIndex,
    embedder: Arc<dyn Embedder>,
    assembler: ContextAssembler,
}

impl Retriever {
    /// Load the corpus and build every index.
    pub fn load(loader: &dyn CorpusLoader, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let store = DocumentStore::load(loader)?;
        Self::build(Arc::new(store), embedder)
    }

    /// Build indices over an existing store.
    #[instrument(skip_all, fields(documents = store.len()))]
    pub fn build(store: Arc<DocumentStore>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let build_index = |field: Field| -> Result<VectorIndex> {
            match store.dimension() {
                Some(dimension) => VectorIndex::build(field, dimension, &store.vectors(field)),
                None => Ok(VectorIndex::empty(field)),
            }
        };

        let chunks = build_index(Field::Chunk)?;
        let titles = build_index(Field::Title)?;
        let summaries = build_index(Field::Summary)?;
        let tags = TagIndex::build(&store);

        info!(
            "Built indices: {} chunks, {} titles, {} summaries, {} tags",
            chunks.len(),
            titles.len(),
            summaries.len(),
            tags.len()
        );

        Ok(Self {
            store,
            chunks,
            titles,
            summaries,
            tags,
            embedder,
            assembler: ContextAssembler::default(),
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        if query.trim().is_empty() {
            return Err(GuaxinimError::InvalidInput("Query is empty".to_string()));
        }
        self.embedder.embed(query).await
    }

    fn index(&self, field: Field) -> &VectorIndex {
        match field {
            Field::Chunk => &self.chunks,
            Field::Title => &self.titles,
            Field::Summary => &self.summaries,
        }
    }

    /// Turn raw neighbors into results.
    fn collect(&self, field: Field, neighbors: Vec<Neighbor>) -> Vec<SearchResult> {
        let entries = self.store.entries(field);

        neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let entry = entries.get(neighbor.position)?;
                let doc = self.store.get(entry.document)?;
                Some(SearchResult {
                    document: entry.document,
                    title: doc.title.clone(),
                    source: doc.source.clone(),
                    matched_text: match field {
                        Field::Chunk => self.store.entry_text(field, entry).map(str::to_string),
                        Field::Title | Field::Summary => None,
                    },
                    summary: match field {
                        Field::Summary => Some(doc.summary.clone()),
                        Field::Chunk | Field::Title => None,
                    },
                    tags: doc.tags.clone(),
                    similarity_score: neighbor.similarity(),
                })
            })
            .collect()
    }

    fn matches(&self, field: Field, query_vector: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let neighbors = self.index(field).search(query_vector, k)?;
        Ok(self.collect(field, neighbors))
    }

    /// Replace each summary match with every chunk of its document.
    fn expand_to_chunks(&self, summary_matches: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut expanded = Vec::new();

        for result in summary_matches {
            let Some(doc) = self.store.get(result.document) else {
                continue;
            };
            if doc.chunks.is_empty() {
                expanded.push(result);
                continue;
            }
            expanded.extend(doc.chunks.iter().map(|chunk| SearchResult {
                matched_text: Some(chunk.clone()),
                ..result.clone()
            }));
        }

        expanded
    }

    /// Rank candidates for a query by the given field.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn candidates(&self, query: &str, field: RankingField, k: usize) -> Result<Candidates> {
        let query_vector = self.embed_query(query).await?;

        let candidates = match field {
            RankingField::Chunks => Candidates {
                primary: self.matches(Field::Chunk, &query_vector, k)?,
                titles: self.matches(Field::Title, &query_vector, TITLE_MATCHES)?,
            },
            RankingField::Summary => Candidates {
                primary: self.expand_to_chunks(self.matches(Field::Summary, &query_vector, k)?),
                titles: Vec::new(),
            },
        };

        debug!(
            "{} primary and {} title candidates",
            candidates.primary.len(),
            candidates.titles.len()
        );

        Ok(candidates)
    }

    /// Retrieve and assemble context for a query.
    pub async fn search(&self, request: &SearchRequest) -> Result<RetrievalContext> {
        let candidates = self.candidates(&request.query, request.field, request.k).await?;
        Ok(self
            .assembler
            .assemble(&self.store, &candidates, request.mode, request.max_whole_files))
    }

    /// Raw chunk matches, for browsing.
    pub async fn search_chunks(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let query_vector = self.embed_query(query).await?;
        self.matches(Field::Chunk, &query_vector, k)
    }

    /// Raw title matches, for browsing.
    pub async fn search_titles(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let query_vector = self.embed_query(query).await?;
        self.matches(Field::Title, &query_vector, k)
    }

    /// Raw summary matches, for browsing.
    pub async fn search_summaries(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let query_vector = self.embed_query(query).await?;
        self.matches(Field::Summary, &query_vector, k)
    }

    pub fn tags_with_frequency(&self) -> Vec<(String, usize)> {
        self.tags.tags_with_frequency()
    }

    pub fn documents_by_tag(&self, tag: &str, limit: usize) -> Vec<&Document> {
        self.tags.documents_by_tag(&self.store, tag, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MemoryLoader;
    use crate::testing::{corpus, document, FakeEmbedder};

    fn retriever() -> (Retriever, Arc<FakeEmbedder>) {
        let embedder = Arc::new(FakeEmbedder::for_corpus());
        let retriever = Retriever::load(&MemoryLoader::new(corpus()), embedder.clone()).unwrap();
        (retriever, embedder)
    }

    #[tokio::test]
    async fn test_single_document_exact_chunk_match() {
        let doc = document(
            "Solo",
            "https://solo",
            &[],
            &[("a", [1.0, 0.0, 0.0]), ("b", [0.0, 1.0, 0.0])],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        );
        let embedder = Arc::new(FakeEmbedder::new(vec![("q", vec![1.0, 0.0, 0.0])]));
        let retriever = Retriever::load(&MemoryLoader::new(vec![doc]), embedder).unwrap();

        let results = retriever.search_chunks("q", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matched_text.as_deref(), Some("a"));
        assert_eq!(results[0].similarity_score, 1.0);
    }

    #[tokio::test]
    async fn test_chunk_search_bounded_and_ordered() {
        let (retriever, _) = retriever();

        for k in [1, 2, 4, 10] {
            let results = retriever.search_chunks("bloom", k).await.unwrap();
            assert!(results.len() <= k);
            for pair in results.windows(2) {
                assert!(pair[0].similarity_score >= pair[1].similarity_score);
            }
        }
        // Four chunks in the corpus.
        assert_eq!(retriever.search_chunks("bloom", 10).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_chunks_mode_embeds_once_and_searches_titles() {
        let (retriever, embedder) = retriever();
        let candidates = retriever
            .candidates("bloom", RankingField::Chunks, 2)
            .await
            .unwrap();

        assert_eq!(embedder.calls(), 1);
        assert_eq!(candidates.primary.len(), 2);
        assert!(candidates.primary.iter().all(|r| r.title == "Pour Over Basics"));
        assert_eq!(candidates.titles.len(), TITLE_MATCHES);
        assert_eq!(candidates.titles[0].title, "Pour Over Basics");
        assert!(candidates.titles[0].matched_text.is_none());
        assert_eq!(candidates.primary[0].source, "https://coffee.example/pourover");
    }

    #[tokio::test]
    async fn test_summary_mode_expands_all_chunks() {
        let (retriever, _) = retriever();
        let candidates = retriever
            .candidates("bloom", RankingField::Summary, 1)
            .await
            .unwrap();

        assert!(candidates.titles.is_empty());
        let texts: Vec<&str> = candidates
            .primary
            .iter()
            .filter_map(|r| r.matched_text.as_deref())
            .collect();
        assert_eq!(texts, vec!["Bloom the grounds for 30 seconds.", "Pour slowly in circles."]);
        assert!(candidates
            .primary
            .iter()
            .all(|r| r.similarity_score == 1.0 && r.summary.as_deref() == Some("Summary of Pour Over Basics")));
        assert_eq!(candidates.primary[0].tags, vec!["brewing", "guide"]);
    }

    #[tokio::test]
    async fn test_title_search() {
        let (retriever, _) = retriever();
        let results = retriever.search_titles("dessert", 10).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Coffee and Desserts");
        assert_eq!(results[0].similarity_score, 1.0);
        assert!(results[1].similarity_score.abs() < 1e-5);
        assert_eq!(results[0].tags, vec!["pairing"]);
        assert!(results.iter().all(|r| r.matched_text.is_none()));
        assert_eq!(retriever.search_titles("dessert", 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_with_request() {
        let (retriever, _) = retriever();
        let request = SearchRequest::new("espresso with dessert")
            .with_field(RankingField::Summary)
            .with_mode(ReturnMode::WholeFile)
            .with_k(2)
            .with_max_whole_files(1);

        let context = retriever.search(&request).await.unwrap();
        assert_eq!(context.sources.len(), 1);
        assert_eq!(context.sources[0].title, "Coffee and Desserts");
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (retriever, embedder) = retriever();
        let err = retriever.search(&SearchRequest::new("  ")).await.unwrap_err();
        assert!(matches!(err, GuaxinimError::InvalidInput(_)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_provider_error() {
        let (retriever, _) = retriever();
        let err = retriever.search(&SearchRequest::new("unknown")).await.unwrap_err();
        assert!(matches!(err, GuaxinimError::Provider(_)));
    }

    #[tokio::test]
    async fn test_corpus_without_embeddings_returns_nothing() {
        let mut doc = document("Plain", "https://plain", &["misc"], &[], [0.0; 3], [0.0; 3]);
        doc.chunk_embeddings = None;
        doc.title_embedding = None;
        doc.summary_embedding = None;

        let embedder = Arc::new(FakeEmbedder::for_corpus());
        let retriever = Retriever::load(&MemoryLoader::new(vec![doc]), embedder).unwrap();

        let context = retriever.search(&SearchRequest::new("bloom")).await.unwrap();
        assert!(context.is_empty());
        assert_eq!(retriever.tags_with_frequency(), vec![("misc".to_string(), 1)]);
    }

    #[test]
    fn test_documents_by_tag() {
        let (retriever, _) = retriever();
        let docs = retriever.documents_by_tag("guide", 10);
        let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Pour Over Basics", "Espresso Dialing"]);
    }
}
