//! Guaxinim - Coffee Assistant
//!
//! A retrieval-augmented assistant that answers coffee questions from a local
//! knowledge base of articles and video transcripts.
//!
//! # Overview
//!
//! Guaxinim allows you to:
//! - Embed processed articles and transcripts into a searchable corpus
//! - Ask questions and get answers grounded in that corpus, with sources
//! - Get step-by-step brewing guides and suggestions for fixing a brew
//! - Browse the corpus by tag
//!
//! # Architecture
//!
//! - `corpus` - Document records, loading, and the in-memory document store
//! - `index` - Exact vector search per embedding field, and the tag index
//! - `retrieval` - Query orchestration and context assembly
//! - `assistant` - Answer generation on top of retrieval
//! - `session` - Rebuilds the assistant when retrieval settings change
//! - `cache` - Persistent response cache
//! - `ingest` - Chunking and embedding of raw records
//! - `embedding` - Embedding generation
//! - `config` - Configuration and prompt templates
//!
//! # Example
//!
//! ```rust,no_run
//! use guaxinim::corpus::DirectoryLoader;
//! use guaxinim::embedding::OpenAIEmbedder;
//! use guaxinim::retrieval::{Retriever, SearchRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let loader = DirectoryLoader::new("data/processed/documents");
//!     let retriever = Retriever::load(&loader, Arc::new(OpenAIEmbedder::new()?))?;
//!
//!     let context = retriever.search(&SearchRequest::new("How long should I bloom?")).await?;
//!     for source in &context.sources {
//!         println!("{} ({})", source.title, source.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod cache;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingest;
pub mod logging;
pub mod openai;
pub mod retrieval;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{GuaxinimError, Result};
