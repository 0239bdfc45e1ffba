//! Test storage manager: an isolated, temp-directory-backed [`Storage`] plus
//! helpers for seeding a named collection with fixture documents.

use std::collections::HashMap;
use std::sync::Arc;

use tempfile::TempDir;
use verity_core::Storage;

/// Fixed embedding dimensionality used across the e2e suite. Small on
/// purpose: the fake embedding clients in `crate::mocks` hand out
/// low-dimensional vectors, there's no real model behind any of this.
pub const TEST_DIMENSIONS: usize = 4;

/// An isolated [`Storage`] instance in its own temp directory, torn down on
/// drop.
pub struct TestStorage {
    pub storage: Arc<Storage>,
    _temp_dir: TempDir,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let storage = Storage::new(Some(temp_dir.path().to_path_buf()), TEST_DIMENSIONS)
            .expect("failed to create test storage");
        Self { storage: Arc::new(storage), _temp_dir: temp_dir }
    }

    /// Insert one document into `collection` with the given metadata,
    /// embedding it with a fixed vector (collections compare embeddings by
    /// cosine similarity; for fixture purposes any dedicated vector per
    /// document is enough to get a deterministic top-k ordering).
    pub fn seed_document(
        &self,
        collection: &str,
        id: &str,
        content: &str,
        url: &str,
        title: &str,
        snippet: &str,
        source: &str,
        embedding: Vec<f32>,
    ) {
        let mut metadata = HashMap::new();
        metadata.insert("url".to_string(), url.to_string());
        metadata.insert("title".to_string(), title.to_string());
        metadata.insert("snippet".to_string(), snippet.to_string());
        metadata.insert("source".to_string(), source.to_string());

        self.storage
            .add(
                collection,
                &[id.to_string()],
                &[content.to_string()],
                &[metadata],
                &[embedding],
            )
            .expect("seed_document: add failed");
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_document_is_queryable() {
        let store = TestStorage::new();
        store.seed_document(
            "current_affairs_24h",
            "id-1",
            "content",
            "https://reuters.com/world/2026/some-article-slug",
            "Title",
            "Snippet",
            "rag",
            vec![0.1, 0.2, 0.3, 0.4],
        );
        let results = store.storage.query("current_affairs_24h", &[0.1, 0.2, 0.3, 0.4], 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.get("url").unwrap(), "https://reuters.com/world/2026/some-article-slug");
    }
}
