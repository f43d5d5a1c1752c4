//! Corpus loading from disk or memory.

use super::Document;
use crate::error::{GuaxinimError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source of document records for building a [`super::DocumentStore`].
pub trait CorpusLoader: Send + Sync {
    /// Load every readable document. Malformed records are skipped, not fatal.
    fn load(&self) -> Result<Vec<Document>>;

    /// Human-readable description of where documents come from.
    fn describe(&self) -> String;
}

/// Parse the contents of one record file: a single document or an array of them.
pub fn parse_records(content: &str) -> std::result::Result<Vec<Document>, serde_json::Error> {
    if content.trim_start().starts_with('[') {
        serde_json::from_str(content)
    } else {
        serde_json::from_str::<Document>(content).map(|doc| vec![doc])
    }
}

/// Loads every `*.json` file under a directory, recursively, in path order.
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load_file(path: &Path) -> Result<Vec<Document>> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| GuaxinimError::MalformedRecord {
            origin: origin.clone(),
            reason: e.to_string(),
        })?;

        parse_records(&content).map_err(|e| GuaxinimError::MalformedRecord {
            origin,
            reason: e.to_string(),
        })
    }
}

/// Collect `*.json` files below `dir`, sorted for a stable scan order.
pub(crate) fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}

impl CorpusLoader for DirectoryLoader {
    fn load(&self) -> Result<Vec<Document>> {
        if !self.root.is_dir() {
            warn!("Documents directory not found: {}", self.root.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        collect_json_files(&self.root, &mut files)?;
        files.sort();

        debug!("Found {} record files in {}", files.len(), self.root.display());

        let mut documents = Vec::new();
        let mut skipped = 0;

        for path in &files {
            match Self::load_file(path) {
                Ok(docs) => documents.extend(docs),
                Err(e) => {
                    warn!("Skipping record file: {}", e);
                    skipped += 1;
                }
            }
        }

        info!(
            "Loaded {} documents from {} files ({} skipped)",
            documents.len(),
            files.len(),
            skipped
        );

        Ok(documents)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// In-memory corpus, for tests and embedding callers that already hold records.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: Vec<Document>,
}

impl MemoryLoader {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

impl CorpusLoader for MemoryLoader {
    fn load(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }

    fn describe(&self) -> String {
        "in-memory corpus".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: &str = r#"{"title": "Bloom", "source": "https://a", "tags": ["brewing"]}"#;
    const MANY: &str = r#"[{"title": "Grind"}, {"title": "Water"}]"#;

    #[test]
    fn test_parse_single_and_array() {
        assert_eq!(parse_records(ONE).unwrap().len(), 1);

        let docs = parse_records(MANY).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].title, "Water");
    }

    #[test]
    fn test_parse_missing_title_fails() {
        let err = parse_records(r#"{"source": "https://a"}"#).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_bad_array_element_reports_its_own_error() {
        let err = parse_records(r#"  [{"title": "Grind"}, {"source": "https://a"}]"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing field `title`"), "{}", message);
        assert!(!message.contains("sequence"), "{}", message);
    }

    #[test]
    fn test_directory_loader_skips_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), ONE).unwrap();
        std::fs::write(dir.path().join("b.json"), "{ not json").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.json"), MANY).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = DirectoryLoader::new(dir.path()).load().unwrap();
        let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Bloom", "Grind", "Water"]);
    }

    #[test]
    fn test_directory_loader_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let docs = DirectoryLoader::new(dir.path().join("missing")).load().unwrap();
        assert!(docs.is_empty());
    }
}
