//! HNSW vector index (one per named collection), used as the in-memory
//! search structure behind the Vector Store (`crate::storage`).
//!
//! Uses USearch for approximate nearest-neighbor search with cosine
//! distance. Persistence to disk is handled by the owning `Storage`, which
//! also keeps a sidecar document/metadata table per collection.

use std::collections::HashMap;
use std::path::Path;
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

/// Default embedding dimensions, matching OpenAI's `text-embedding-3-small`.
pub const DEFAULT_DIMENSIONS: usize = 1536;

pub const DEFAULT_CONNECTIVITY: usize = 16;
pub const DEFAULT_EXPANSION_ADD: usize = 128;
pub const DEFAULT_EXPANSION_SEARCH: usize = 64;

#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum VectorSearchError {
    IndexCreation(String),
    IndexAdd(String),
    IndexSearch(String),
    IndexPersistence(String),
    InvalidDimensions(usize, usize),
}

impl std::fmt::Display for VectorSearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorSearchError::IndexCreation(e) => write!(f, "index creation failed: {e}"),
            VectorSearchError::IndexAdd(e) => write!(f, "failed to add vector: {e}"),
            VectorSearchError::IndexSearch(e) => write!(f, "search failed: {e}"),
            VectorSearchError::IndexPersistence(e) => write!(f, "persistence failed: {e}"),
            VectorSearchError::InvalidDimensions(expected, got) => {
                write!(f, "invalid dimensions: expected {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for VectorSearchError {}

#[derive(Debug, Clone)]
pub struct VectorIndexConfig {
    pub dimensions: usize,
    pub connectivity: usize,
    pub expansion_add: usize,
    pub expansion_search: usize,
    pub metric: MetricKind,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            connectivity: DEFAULT_CONNECTIVITY,
            expansion_add: DEFAULT_EXPANSION_ADD,
            expansion_search: DEFAULT_EXPANSION_SEARCH,
            metric: MetricKind::Cos,
        }
    }
}

/// HNSW index keyed by opaque string ids (chunk/document ids).
pub struct VectorIndex {
    index: Index,
    config: VectorIndexConfig,
    key_to_id: HashMap<String, u64>,
    id_to_key: HashMap<u64, String>,
    next_id: u64,
}

impl VectorIndex {
    pub fn new() -> Result<Self, VectorSearchError> {
        Self::with_config(VectorIndexConfig::default())
    }

    pub fn with_config(config: VectorIndexConfig) -> Result<Self, VectorSearchError> {
        let options = IndexOptions {
            dimensions: config.dimensions,
            metric: config.metric,
            quantization: ScalarKind::F32,
            connectivity: config.connectivity,
            expansion_add: config.expansion_add,
            expansion_search: config.expansion_search,
            multi: false,
        };
        let index = Index::new(&options).map_err(|e| VectorSearchError::IndexCreation(e.to_string()))?;
        Ok(Self { index, config, key_to_id: HashMap::new(), id_to_key: HashMap::new(), next_id: 0 })
    }

    pub fn len(&self) -> usize {
        self.index.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    pub fn reserve(&self, capacity: usize) -> Result<(), VectorSearchError> {
        self.index.reserve(capacity).map_err(|e| VectorSearchError::IndexCreation(e.to_string()))
    }

    pub fn add(&mut self, key: &str, vector: &[f32]) -> Result<(), VectorSearchError> {
        if vector.len() != self.config.dimensions {
            return Err(VectorSearchError::InvalidDimensions(self.config.dimensions, vector.len()));
        }

        if let Some(&existing_id) = self.key_to_id.get(key) {
            self.index.remove(existing_id).map_err(|e| VectorSearchError::IndexAdd(e.to_string()))?;
            self.reserve(self.index.size() + 1)?;
            self.index.add(existing_id, vector).map_err(|e| VectorSearchError::IndexAdd(e.to_string()))?;
            return Ok(());
        }

        let current_capacity = self.index.capacity();
        let current_size = self.index.size();
        if current_size >= current_capacity {
            let new_capacity = std::cmp::max(current_capacity * 2, 16);
            self.reserve(new_capacity)?;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.index.add(id, vector).map_err(|e| VectorSearchError::IndexAdd(e.to_string()))?;
        self.key_to_id.insert(key.to_string(), id);
        self.id_to_key.insert(id, key.to_string());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<bool, VectorSearchError> {
        if let Some(id) = self.key_to_id.remove(key) {
            self.id_to_key.remove(&id);
            self.index.remove(id).map_err(|e| VectorSearchError::IndexAdd(e.to_string()))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.key_to_id.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.key_to_id.keys()
    }

    /// Search for the `limit` nearest neighbors, clamped to the index size.
    /// Cosine distance (`[0, 2]`) is mapped to similarity in `[0, 1]` via
    /// `1 - distance / 2`.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<(String, f32)>, VectorSearchError> {
        if query.len() != self.config.dimensions {
            return Err(VectorSearchError::InvalidDimensions(self.config.dimensions, query.len()));
        }
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let limit = limit.min(self.len());
        let results = self.index.search(query, limit).map_err(|e| VectorSearchError::IndexSearch(e.to_string()))?;

        let mut search_results = Vec::with_capacity(results.keys.len());
        for (key, distance) in results.keys.iter().zip(results.distances.iter()) {
            if let Some(string_key) = self.id_to_key.get(key) {
                let score = 1.0 - distance / 2.0;
                search_results.push((string_key.clone(), score));
            }
        }
        Ok(search_results)
    }

    /// Retrieve the stored vector for `key`, if present. Used by the store's
    /// `clone` operation to copy a collection's vectors without re-embedding.
    pub fn get(&self, key: &str) -> Result<Option<Vec<f32>>, VectorSearchError> {
        let Some(&id) = self.key_to_id.get(key) else {
            return Ok(None);
        };
        let mut buffer = vec![0.0f32; self.config.dimensions];
        let count = self.index.get(id, &mut buffer).map_err(|e| VectorSearchError::IndexSearch(e.to_string()))?;
        if count == 0 {
            Ok(None)
        } else {
            Ok(Some(buffer))
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), VectorSearchError> {
        let path_str =
            path.to_str().ok_or_else(|| VectorSearchError::IndexPersistence("invalid path".to_string()))?;
        self.index.save(path_str).map_err(|e| VectorSearchError::IndexPersistence(e.to_string()))?;

        let mappings_path = path.with_extension("mappings.json");
        let mappings = serde_json::json!({ "key_to_id": self.key_to_id, "next_id": self.next_id });
        let mappings_str =
            serde_json::to_string(&mappings).map_err(|e| VectorSearchError::IndexPersistence(e.to_string()))?;
        std::fs::write(&mappings_path, mappings_str).map_err(|e| VectorSearchError::IndexPersistence(e.to_string()))?;
        Ok(())
    }

    pub fn load(path: &Path, config: VectorIndexConfig) -> Result<Self, VectorSearchError> {
        let path_str =
            path.to_str().ok_or_else(|| VectorSearchError::IndexPersistence("invalid path".to_string()))?;
        let options = IndexOptions {
            dimensions: config.dimensions,
            metric: config.metric,
            quantization: ScalarKind::F32,
            connectivity: config.connectivity,
            expansion_add: config.expansion_add,
            expansion_search: config.expansion_search,
            multi: false,
        };
        let index = Index::new(&options).map_err(|e| VectorSearchError::IndexCreation(e.to_string()))?;
        index.load(path_str).map_err(|e| VectorSearchError::IndexPersistence(e.to_string()))?;

        let mappings_path = path.with_extension("mappings.json");
        let mappings_str = std::fs::read_to_string(&mappings_path)
            .map_err(|e| VectorSearchError::IndexPersistence(e.to_string()))?;
        let mappings: serde_json::Value =
            serde_json::from_str(&mappings_str).map_err(|e| VectorSearchError::IndexPersistence(e.to_string()))?;

        let key_to_id: HashMap<String, u64> = serde_json::from_value(mappings["key_to_id"].clone())
            .map_err(|e| VectorSearchError::IndexPersistence(e.to_string()))?;
        let next_id: u64 = mappings["next_id"]
            .as_u64()
            .ok_or_else(|| VectorSearchError::IndexPersistence("invalid next_id".to_string()))?;
        let id_to_key: HashMap<u64, String> = key_to_id.iter().map(|(k, &v)| (v, k.clone())).collect();

        Ok(Self { index, config, key_to_id, id_to_key, next_id })
    }
}
