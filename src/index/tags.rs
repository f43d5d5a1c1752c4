//! Exact-match tag index.

use crate::corpus::{Document, DocumentStore};
use std::collections::HashMap;

/// Maps each tag to the documents carrying it, in corpus scan order.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    documents: HashMap<String, Vec<usize>>,
}

impl TagIndex {
    pub fn build(store: &DocumentStore) -> Self {
        let mut documents: HashMap<String, Vec<usize>> = HashMap::new();
        for (id, doc) in store.documents().iter().enumerate() {
            for tag in &doc.tags {
                documents.entry(tag.clone()).or_default().push(id);
            }
        }
        Self { documents }
    }

    /// Tags with their document counts, most frequent first, ties by name.
    pub fn tags_with_frequency(&self) -> Vec<(String, usize)> {
        let mut tags: Vec<(String, usize)> = self
            .documents
            .iter()
            .map(|(tag, docs)| (tag.clone(), docs.len()))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }

    /// Document positions carrying `tag`, in scan order, at most `limit`.
    pub fn document_ids(&self, tag: &str, limit: usize) -> Vec<usize> {
        self.documents
            .get(tag)
            .map(|ids| ids.iter().take(limit).copied().collect())
            .unwrap_or_default()
    }

    /// Documents carrying `tag`, in scan order, at most `limit`.
    pub fn documents_by_tag<'a>(
        &self,
        store: &'a DocumentStore,
        tag: &str,
        limit: usize,
    ) -> Vec<&'a Document> {
        self.document_ids(tag, limit)
            .into_iter()
            .filter_map(|id| store.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(tagged: &[(&str, Vec<&str>)]) -> DocumentStore {
        let docs = tagged
            .iter()
            .map(|(title, tags)| Document {
                title: title.to_string(),
                source: format!("https://example.com/ {}", title),
                summary: String::new(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                chunks: vec![],
                chunk_embeddings: None,
                title_embedding: None,
                summary_embedding: None,
                full_text: None,
            })
            .collect();
        DocumentStore::from_documents(docs, "test").unwrap()
    }

    #[test]
    fn test_frequency_order_breaks_ties_by_name() {
        let store = store(&[
            ("A", vec!["brewing", "guide"]),
            ("B", vec!["brewing"]),
            ("C", vec!["guide", "advanced"]),
        ]);
        let index = TagIndex::build(&store);

        assert_eq!(
            index.tags_with_frequency(),
            vec![
                ("brewing".to_string(), 2),
                ("guide".to_string(), 2),
                ("advanced".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_order_is_total_for_any_multiset() {
        let store = store(&[
            ("A", vec!["z", "b", "a"]),
            ("B", vec!["b", "z"]),
            ("C", vec!["a", "c"]),
            ("D", vec!["c", "b"]),
        ]);
        let tags = TagIndex::build(&store).tags_with_frequency();

        for pair in tags.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.1 > b.1 || (a.1 == b.1 && a.0 < b.0));
        }
        assert_eq!(tags[0], ("b".to_string(), 3));
    }

    #[test]
    fn test_documents_by_tag_in_scan_order_with_limit() {
        let store = store(&[
            ("A", vec!["brewing"]),
            ("B", vec!["espresso"]),
            ("C", vec!["brewing"]),
            ("D", vec!["brewing"]),
        ]);
        let index = TagIndex::build(&store);

        let docs = index.documents_by_tag(&store, "brewing", 2);
        let titles: Vec<&str> = docs.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(docs[0].source, "https://example.com/A");

        assert!(index.documents_by_tag(&store, "unknown", 10).is_empty());
    }
}
