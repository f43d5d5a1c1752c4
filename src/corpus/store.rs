//! In-memory document store with per-field position mappings.

use super::{normalize_source, CorpusLoader, Document, Field, IndexEntry};
use crate::error::{GuaxinimError, Result};
use tracing::{info, instrument, warn};

/// Owns every document and maps flat index positions back to them.
///
/// Built once and read-only afterwards. Construction fails rather than
/// producing an empty store.
#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
    dimension: Option<usize>,
    chunk_entries: Vec<IndexEntry>,
    title_entries: Vec<IndexEntry>,
    summary_entries: Vec<IndexEntry>,
}

impl DocumentStore {
    /// Load documents through a loader and build the store.
    #[instrument(skip_all, fields(location = %loader.describe()))]
    pub fn load(loader: &dyn CorpusLoader) -> Result<Self> {
        let documents = loader.load()?;
        Self::from_documents(documents, &loader.describe())
    }

    /// Build the store from already-parsed documents.
    ///
    /// The embedding dimension is taken from the first embedding of the first
    /// document that has one. A mismatch inside that document is fatal; a
    /// mismatch in any later document only skips it.
    pub fn from_documents(documents: Vec<Document>, location: &str) -> Result<Self> {
        let mut dimension: Option<usize> = None;
        let mut accepted = Vec::with_capacity(documents.len());

        for mut doc in documents {
            match validate(&doc, dimension) {
                Ok(found) => {
                    dimension = dimension.or(found);
                    doc.source = normalize_source(&doc.source);
                    dedup_in_order(&mut doc.tags);
                    accepted.push(doc);
                }
                Err(e @ GuaxinimError::DimensionMismatch { .. }) if dimension.is_none() => {
                    return Err(e);
                }
                Err(e) if e.is_per_record() => warn!("Skipping document: {}", e),
                Err(e) => return Err(e),
            }
        }

        if accepted.is_empty() {
            return Err(GuaxinimError::CorpusEmpty {
                location: location.to_string(),
            });
        }

        let mut store = Self {
            documents: accepted,
            dimension,
            chunk_entries: Vec::new(),
            title_entries: Vec::new(),
            summary_entries: Vec::new(),
        };
        store.build_mappings();

        info!(
            "Document store ready: {} documents, {} chunks, {} titles, {} summaries",
            store.documents.len(),
            store.chunk_entries.len(),
            store.title_entries.len(),
            store.summary_entries.len()
        );

        Ok(store)
    }

    fn build_mappings(&mut self) {
        for (id, doc) in self.documents.iter().enumerate() {
            if let Some(embeddings) = doc.chunk_embeddings() {
                self.chunk_entries
                    .extend((0..embeddings.len()).map(|chunk| IndexEntry {
                        document: id,
                        chunk: Some(chunk),
                    }));
            }
            if doc.title_embedding().is_some() {
                self.title_entries.push(IndexEntry { document: id, chunk: None });
            }
            if doc.summary_embedding().is_some() {
                self.summary_entries.push(IndexEntry { document: id, chunk: None });
            }
        }
    }

    /// All documents in scan order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: usize) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false for a constructed store.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Shared embedding dimension, if any document carries embeddings.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Position mapping for one field's index.
    pub fn entries(&self, field: Field) -> &[IndexEntry] {
        match field {
            Field::Chunk => &self.chunk_entries,
            Field::Title => &self.title_entries,
            Field::Summary => &self.summary_entries,
        }
    }

    /// Embedding vectors for one field, aligned with [`Self::entries`].
    pub fn vectors(&self, field: Field) -> Vec<&[f32]> {
        self.entries(field)
            .iter()
            .filter_map(|entry| self.vector(field, entry))
            .collect()
    }

    fn vector(&self, field: Field, entry: &IndexEntry) -> Option<&[f32]> {
        let doc = self.documents.get(entry.document)?;
        match field {
            Field::Chunk => doc
                .chunk_embeddings()
                .and_then(|embeddings| embeddings.get(entry.chunk?))
                .map(Vec::as_slice),
            Field::Title => doc.title_embedding(),
            Field::Summary => doc.summary_embedding(),
        }
    }

    /// Text behind an index entry: the chunk, title, or summary.
    pub fn entry_text(&self, field: Field, entry: &IndexEntry) -> Option<&str> {
        let doc = self.documents.get(entry.document)?;
        match field {
            Field::Chunk => doc.chunks.get(entry.chunk?).map(String::as_str),
            Field::Title => Some(doc.title.as_str()),
            Field::Summary => Some(doc.summary.as_str()),
        }
    }
}

/// Check a document's embeddings. Returns the dimension it establishes, if any.
fn validate(doc: &Document, expected: Option<usize>) -> Result<Option<usize>> {
    if let Some(embeddings) = doc.chunk_embeddings() {
        if embeddings.len() != doc.chunks.len() {
            return Err(GuaxinimError::MalformedRecord {
                origin: doc.title.clone(),
                reason: format!(
                    "{} chunk embeddings for {} chunks",
                    embeddings.len(),
                    doc.chunks.len()
                ),
            });
        }
    }

    let mut dimension = expected;
    let mut check = |field: Field, vector: &[f32]| -> Result<()> {
        match dimension {
            None => {
                dimension = Some(vector.len());
                Ok(())
            }
            Some(d) if d == vector.len() => Ok(()),
            Some(d) => Err(GuaxinimError::DimensionMismatch {
                context: format!("{} embedding of '{}'", field, doc.title),
                expected: d,
                found: vector.len(),
            }),
        }
    };

    if let Some(v) = doc.title_embedding() {
        check(Field::Title, v)?;
    }
    if let Some(v) = doc.summary_embedding() {
        check(Field::Summary, v)?;
    }
    for v in doc.chunk_embeddings().unwrap_or_default() {
        check(Field::Chunk, v.as_slice())?;
    }

    Ok(dimension)
}

fn dedup_in_order(tags: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    tags.retain(|tag| seen.insert(tag.clone()));
}
