//! Document corpus: records produced by ingestion and the in-memory store built from them.
//!
//! Each [`Document`] carries its text split into chunks plus three kinds of
//! embeddings (title, summary, one per chunk). The [`DocumentStore`] owns every
//! document for the lifetime of the process; indices only refer back to
//! documents by position.

mod loader;
mod store;

pub(crate) use loader::collect_json_files;
pub use loader::{parse_records, CorpusLoader, DirectoryLoader, MemoryLoader};
pub use store::DocumentStore;

use serde::{Deserialize, Serialize};

/// An ingested document record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// Source URL. May contain stray whitespace until the store normalizes it.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub chunks: Vec<String>,
    #[serde(default, alias = "embeddings", skip_serializing_if = "Option::is_none")]
    pub chunk_embeddings: Option<Vec<Vec<f32>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_embedding: Option<Vec<f32>>,
    /// Full body text. When absent, the chunks are concatenated instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

impl Document {
    /// Title embedding, if present and non-empty.
    pub fn title_embedding(&self) -> Option<&[f32]> {
        self.title_embedding
            .as_deref()
            .filter(|v| !v.is_empty())
    }

    /// Summary embedding, if present and non-empty.
    pub fn summary_embedding(&self) -> Option<&[f32]> {
        self.summary_embedding
            .as_deref()
            .filter(|v| !v.is_empty())
    }

    /// Chunk embeddings, if present and non-empty.
    pub fn chunk_embeddings(&self) -> Option<&[Vec<f32>]> {
        self.chunk_embeddings
            .as_deref()
            .filter(|v| !v.is_empty())
    }

    /// The document body used for whole-file context.
    pub fn text(&self) -> String {
        match &self.full_text {
            Some(text) if !text.trim().is_empty() => text.clone(),
            _ => self.chunks.join(" "),
        }
    }
}

/// Remove every whitespace character from a source URL.
pub fn normalize_source(source: &str) -> String {
    source.chars().filter(|c| !c.is_whitespace()).collect()
}

/// One of the three embedded fields of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Chunk,
    Title,
    Summary,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Chunk => write!(f, "chunk"),
            Field::Title => write!(f, "title"),
            Field::Summary => write!(f, "summary"),
        }
    }
}

/// Back-reference from a flat index position to its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Position of the document in the store.
    pub document: usize,
    /// Chunk position within the document (chunk field only).
    pub chunk: Option<usize>,
}
