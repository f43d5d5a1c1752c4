//! Ingestion: turns processed source records into embedded document records.
//!
//! Upstream extraction (PDFs, transcripts) produces one JSON record per
//! source with the full text, a summary and tags. The [`EmbeddingsProcessor`]
//! chunks the text, embeds chunks, title and summary, and writes the document
//! records the corpus loader reads.

mod chunking;

pub use chunking::{split_into_chunks, DEFAULT_CHUNK_SIZE};

use crate::corpus::{collect_json_files, Document};
use crate::embedding::Embedder;
use crate::error::{GuaxinimError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A processed source record awaiting embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub title: String,
    pub source: String,
    pub full_text: String,
    pub summary: String,
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct VideoInfo {
    title: String,
    #[serde(default)]
    source: String,
}

/// Flat records (PDFs) carry title/source at the top level; transcript
/// records nest them under `video_info`.
#[derive(Deserialize)]
struct RawRecord {
    title: Option<String>,
    source: Option<String>,
    video_info: Option<VideoInfo>,
    full_text: String,
    summary: String,
    tags: Vec<String>,
}

impl RawDocument {
    /// Parse one raw record. `origin` names the record in errors.
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let malformed = |reason: String| GuaxinimError::MalformedRecord {
            origin: origin.to_string(),
            reason,
        };

        let record: RawRecord =
            serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;

        let (title, source) = match record.video_info {
            Some(info) => (info.title, info.source),
            None => (
                record
                    .title
                    .ok_or_else(|| malformed("missing field `title`".to_string()))?,
                record.source.unwrap_or_default(),
            ),
        };

        Ok(Self {
            title,
            source,
            full_text: record.full_text,
            summary: record.summary,
            tags: record.tags,
        })
    }
}

/// Outcome of processing a directory of raw records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub processed: usize,
    pub failed: usize,
    /// Paths of the document records written.
    pub written: Vec<PathBuf>,
}

/// Chunks and embeds raw records into corpus documents.
pub struct EmbeddingsProcessor {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
}

impl EmbeddingsProcessor {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Embed one record. Chunks, title and summary go out in a single batch.
    #[instrument(skip_all, fields(title = %raw.title))]
    pub async fn process(&self, raw: RawDocument) -> Result<Document> {
        let chunks = split_into_chunks(&raw.full_text, self.chunk_size);

        let mut texts = chunks.clone();
        texts.push(raw.title.clone());
        texts.push(raw.summary.clone());

        let mut embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(GuaxinimError::Provider(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        let summary_embedding = embeddings.pop();
        let title_embedding = embeddings.pop();

        debug!("Embedded {} chunks", chunks.len());

        Ok(Document {
            title: raw.title,
            source: raw.source,
            summary: raw.summary,
            tags: raw.tags,
            chunks,
            chunk_embeddings: Some(embeddings),
            title_embedding,
            summary_embedding,
            full_text: Some(raw.full_text),
        })
    }

    /// Read, embed and return the document for one raw record file.
    pub async fn process_file(&self, path: &Path) -> Result<Document> {
        let content = std::fs::read_to_string(path)?;
        let raw = RawDocument::parse(&content, &path.display().to_string())?;
        self.process(raw).await
    }

    /// Embed every `*.json` record under `input` and write documents to `output`.
    ///
    /// Output files keep the input file name. A failing record is logged and
    /// counted; it never stops the run.
    pub async fn process_directory(&self, input: &Path, output: &Path) -> Result<ProcessSummary> {
        let mut summary = ProcessSummary::default();

        if !input.is_dir() {
            warn!("Raw records directory not found: {}", input.display());
            return Ok(summary);
        }

        std::fs::create_dir_all(output)?;

        let mut files = Vec::new();
        collect_json_files(input, &mut files)?;
        files.sort();

        info!("Processing {} raw records from {}", files.len(), input.display());

        for path in files {
            match self.process_and_write(&path, output).await {
                Ok(written) => {
                    debug!("Saved embeddings to {}", written.display());
                    summary.processed += 1;
                    summary.written.push(written);
                }
                Err(e) => {
                    warn!("Error processing {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Embedded {} records ({} failed)",
            summary.processed, summary.failed
        );

        Ok(summary)
    }

    async fn process_and_write(&self, path: &Path, output: &Path) -> Result<PathBuf> {
        let document = self.process_file(path).await?;

        let file_name = path
            .file_name()
            .ok_or_else(|| GuaxinimError::InvalidInput(format!("Not a file: {}", path.display())))?;
        let target = output.join(file_name);

        std::fs::write(&target, serde_json::to_string_pretty(&document)?)?;
        Ok(target)
    }
}
