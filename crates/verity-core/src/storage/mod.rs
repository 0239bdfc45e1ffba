//! Vector Store (C5): named collections, each an HNSW index (`crate::search::VectorIndex`)
//! paired with a sqlite sidecar table holding the document text and metadata.
//!
//! WAL-mode sqlite, `ProjectDirs` for the default data directory,
//! owner-only file permissions on Unix. Each collection gets its own
//! sqlite file and its own `VectorIndex`, since collections here are
//! swapped and cloned wholesale by the knowledge-base refresh job (§4.14).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use rusqlite::{params, Connection};

use crate::error::VectorStoreError;
use crate::search::vector::{VectorIndex, VectorIndexConfig};

pub type Result<T> = std::result::Result<T, VectorStoreError>;

/// A single scored match returned from `query`.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, String>,
    pub score: f32,
}

struct Collection {
    conn: Connection,
    index: VectorIndex,
    index_path: PathBuf,
}

impl Collection {
    fn open(path: &Path, dimensions: usize) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::configure_connection(&conn)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL
            );",
        )?;

        let mut index = VectorIndex::with_config(VectorIndexConfig { dimensions, ..VectorIndexConfig::default() })
            .map_err(|e| VectorStoreError::Index(e.to_string()))?;

        let vectors_path = path.with_extension("usearch");
        if vectors_path.exists() {
            match VectorIndex::load(&vectors_path, VectorIndexConfig { dimensions, ..VectorIndexConfig::default() }) {
                Ok(loaded) => index = loaded,
                Err(e) => tracing::warn!("failed to load vector index at {vectors_path:?}: {e}"),
            }
        }

        Ok(Self { conn, index, index_path: vectors_path })
    }

    fn persist_index(&self) -> Result<()> {
        self.index.save(&self.index_path).map_err(|e| VectorStoreError::Index(e.to_string()))
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }
}

/// Vector store over a set of named collections, each backed by its own
/// sqlite file and HNSW index under `data_dir`.
pub struct Storage {
    data_dir: PathBuf,
    dimensions: usize,
    collections: Mutex<HashMap<String, Collection>>,
}

impl Storage {
    /// Open (creating if absent) the store's data directory.
    pub fn new(data_dir: Option<PathBuf>, dimensions: usize) -> Result<Self> {
        let data_dir = match data_dir {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "verity", "core")
                    .ok_or_else(|| VectorStoreError::Index("could not determine project directories".to_string()))?;
                proj_dirs.data_dir().to_path_buf()
            }
        };
        std::fs::create_dir_all(&data_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(&data_dir, perms);
        }
        Ok(Self { data_dir, dimensions, collections: Mutex::new(HashMap::new()) })
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.sqlite3"))
    }

    fn with_collection<T>(&self, name: &str, f: impl FnOnce(&mut Collection) -> Result<T>) -> Result<T> {
        let mut collections = self.collections.lock().expect("collections lock poisoned");
        if !collections.contains_key(name) {
            let path = self.collection_path(name);
            let collection = Collection::open(&path, self.dimensions)?;
            collections.insert(name.to_string(), collection);
        }
        f(collections.get_mut(name).expect("just inserted"))
    }

    /// Insert pre-computed embeddings. Rejects length mismatch across the
    /// four parallel slices. Non-scalar metadata values are the caller's
    /// responsibility to have already coerced to strings.
    pub fn add(
        &self,
        name: &str,
        ids: &[String],
        documents: &[String],
        metadatas: &[HashMap<String, String>],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if ids.len() != documents.len() || ids.len() != metadatas.len() || ids.len() != embeddings.len() {
            return Err(VectorStoreError::LengthMismatch {
                ids: ids.len(),
                documents: documents.len(),
                metadatas: metadatas.len(),
                embeddings: embeddings.len(),
            });
        }
        if ids.is_empty() {
            return Ok(());
        }
        self.with_collection(name, |collection| {
            let tx = collection.conn.transaction()?;
            for ((id, doc), meta) in ids.iter().zip(documents.iter()).zip(metadatas.iter()) {
                let meta_json = serde_json::to_string(meta).unwrap_or_else(|_| "{}".to_string());
                tx.execute(
                    "INSERT INTO documents (id, content, metadata) VALUES (?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET content = excluded.content, metadata = excluded.metadata",
                    params![id, doc, meta_json],
                )?;
            }
            tx.commit()?;
            for (id, embedding) in ids.iter().zip(embeddings.iter()) {
                collection.index.add(id, embedding).map_err(|e| VectorStoreError::Index(e.to_string()))?;
            }
            collection.persist_index()
        })
    }

    /// Nearest-neighbor query against `name`. `k` is clamped to the
    /// collection size; empty collections return `[]`.
    pub fn query(&self, name: &str, vector: &[f32], k: usize) -> Result<Vec<QueryMatch>> {
        self.with_collection(name, |collection| {
            if collection.index.is_empty() {
                return Ok(Vec::new());
            }
            let k = k.min(collection.index.len());
            let hits = collection.index.search(vector, k).map_err(|e| VectorStoreError::Index(e.to_string()))?;

            let mut out = Vec::with_capacity(hits.len());
            for (id, score) in hits {
                let row: Option<(String, String)> = collection
                    .conn
                    .query_row(
                        "SELECT content, metadata FROM documents WHERE id = ?1",
                        params![id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .ok();
                if let Some((content, metadata_json)) = row {
                    let metadata: HashMap<String, String> = serde_json::from_str(&metadata_json).unwrap_or_default();
                    out.push(QueryMatch { id, content, metadata, score });
                }
            }
            Ok(out)
        })
    }

    /// Best-effort drop; no error if the collection doesn't exist.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.lock().expect("collections lock poisoned");
        collections.remove(name);
        let path = self.collection_path(name);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        let vectors_path = path.with_extension("usearch");
        if vectors_path.exists() {
            std::fs::remove_file(&vectors_path)?;
        }
        Ok(())
    }

    /// Exhaustive dump of a collection's contents (id, document, metadata,
    /// embedding), for use by `clone_collection`.
    pub fn get_all(
        &self,
        name: &str,
    ) -> Result<(Vec<String>, Vec<String>, Vec<HashMap<String, String>>, Vec<Vec<f32>>)> {
        self.with_collection(name, |collection| {
            let mut stmt = collection.conn.prepare("SELECT id, content, metadata FROM documents")?;
            let rows: Vec<(String, String, String)> =
                stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?.filter_map(|r| r.ok()).collect();
            drop(stmt);

            let mut ids = Vec::with_capacity(rows.len());
            let mut documents = Vec::with_capacity(rows.len());
            let mut metadatas = Vec::with_capacity(rows.len());
            let mut embeddings = Vec::with_capacity(rows.len());
            for (id, content, metadata_json) in rows {
                let Some(vector) = collection.index.get(&id).map_err(|e| VectorStoreError::Index(e.to_string()))?
                else {
                    continue;
                };
                let metadata: HashMap<String, String> = serde_json::from_str(&metadata_json).unwrap_or_default();
                ids.push(id);
                documents.push(content);
                metadatas.push(metadata);
                embeddings.push(vector);
            }
            Ok((ids, documents, metadatas, embeddings))
        })
    }

    /// Atomically promote `src` to `dst`: delete `dst`, copy all content and
    /// vectors from `src` to `dst`, then delete `src`. When `src` is empty,
    /// `dst` ends up empty too. Used to make the knowledge-base refresh
    /// atomic from the reader's perspective.
    pub fn clone_collection(&self, src: &str, dst: &str) -> Result<()> {
        self.delete(dst)?;
        let (ids, documents, metadatas, embeddings) = self.get_all(src)?;
        if !ids.is_empty() {
            self.add(dst, &ids, &documents, &metadatas, &embeddings)?;
        } else {
            // Force creation of an empty destination collection.
            self.with_collection(dst, |_| Ok(()))?;
        }
        self.delete(src)?;
        Ok(())
    }
}
