//! Deterministic fakes and fixtures shared by unit tests.

use crate::assistant::{CompletionRequest, Generator};
use crate::corpus::Document;
use crate::embedding::Embedder;
use crate::error::{GuaxinimError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embedder that returns fixed vectors for known texts.
#[derive(Default)]
pub struct FakeEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new(entries: Vec<(&str, Vec<f32>)>) -> Self {
        Self {
            vectors: entries
                .into_iter()
                .map(|(text, vector)| (text.to_string(), vector))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queries understood by [`corpus`].
    pub fn for_corpus() -> Self {
        Self::new(vec![
            ("bloom", vec![1.0, 0.0, 0.0]),
            ("dessert", vec![0.0, 0.0, 1.0]),
            ("espresso with dessert", vec![0.0, 0.8, 0.6]),
        ])
    }

    /// Number of `embed`/`embed_batch` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| GuaxinimError::Provider(format!("no fixture embedding for '{}'", text)))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| vec![text.len() as f32, 1.0, 0.0])
            })
            .collect())
    }

    fn dimensions(&self) -> usize {
        3
    }
}

/// Generator that records every request and replies with a canned answer.
pub struct FakeGenerator {
    reply: std::result::Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeGenerator {
    pub fn replying(answer: &str) -> Self {
        Self {
            reply: Ok(answer.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(GuaxinimError::Provider)
    }
}

/// Build a three-dimensional fixture document.
pub fn document(
    title: &str,
    source: &str,
    tags: &[&str],
    chunks: &[(&str, [f32; 3])],
    title_vector: [f32; 3],
    summary_vector: [f32; 3],
) -> Document {
    Document {
        title: title.to_string(),
        source: source.to_string(),
        summary: format!("Summary of {}", title),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        chunks: chunks.iter().map(|(text, _)| text.to_string()).collect(),
        chunk_embeddings: Some(chunks.iter().map(|(_, v)| v.to_vec()).collect()),
        title_embedding: Some(title_vector.to_vec()),
        summary_embedding: Some(summary_vector.to_vec()),
        full_text: None,
    }
}

/// Small corpus along three axes: brewing (x), espresso (y), dessert (z).
pub fn corpus() -> Vec<Document> {
    let mut pour_over = document(
        "Pour Over Basics",
        "https://coffee.example/pour over",
        &["brewing", "guide"],
        &[
            ("Bloom the grounds for 30 seconds.", [1.0, 0.0, 0.0]),
            ("Pour slowly in circles.", [0.8, 0.6, 0.0]),
        ],
        [0.8, 0.6, 0.0],
        [1.0, 0.0, 0.0],
    );
    pour_over.full_text = Some("The complete pour over guide.".to_string());

    vec![
        pour_over,
        document(
            "Espresso Dialing",
            "https://coffee.example/espresso",
            &["espresso", "guide"],
            &[("Grind finer if the shot runs fast.", [0.0, 1.0, 0.0])],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ),
        document(
            "Coffee and Desserts",
            "https://coffee.example/desserts",
            &["pairing"],
            &[("Dark roasts pair with chocolate.", [0.0, 0.6, 0.8])],
            [0.0, 0.0, 1.0],
            [0.0, 0.6, 0.8],
        ),
    ]
}
