use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::document::Document;

const INDEX_FILE: &str = "index.json";
const DOCSTORE_FILE: &str = "docstore.json";

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("texts and embeddings differ in length: {texts} texts, {embeddings} embeddings")]
    UnpairedInput { texts: usize, embeddings: usize },
    #[error("no snapshot found at {0}")]
    SnapshotNotFound(PathBuf),
    #[error("snapshot I/O failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// A single retrieval match, ordered by ascending `distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    pub text: String,
    pub distance: f32,
}

/// Flat exact-search vector store over squared-L2 distance.
///
/// Embeddings and their source texts are held in insertion order, with
/// document IDs assigned monotonically from 0 and never reused. The store
/// can be snapshotted to a directory and restored later without
/// re-embedding anything.
pub struct EmbeddingIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
    document_map: BTreeMap<u64, String>,
    next_id: u64,
}

#[derive(Serialize, Deserialize)]
struct IndexFile {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

#[derive(Serialize, Deserialize)]
struct DocstoreFile {
    document_map: BTreeMap<u64, String>,
    next_id: u64,
}

impl EmbeddingIndex {
    /// Creates an empty index. `dimension` is fixed for the store's lifetime;
    /// every embedding added or searched with must have exactly that length.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
            document_map: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.document_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_map.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = Document> + '_ {
        self.document_map
            .iter()
            .map(|(id, text)| Document::new(*id, text.clone()))
    }

    /// Adds texts with their embeddings, returning the assigned document IDs
    /// in input order.
    ///
    /// The operation is atomic: if any embedding has the wrong dimension the
    /// whole call fails and the index is left unchanged.
    pub fn add(
        &mut self,
        texts: &[String],
        embeddings: &[Vec<f32>],
    ) -> Result<Vec<u64>, VectorStoreError> {
        if texts.len() != embeddings.len() {
            return Err(VectorStoreError::UnpairedInput {
                texts: texts.len(),
                embeddings: embeddings.len(),
            });
        }
        for embedding in embeddings {
            if embedding.len() != self.dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        let mut ids = Vec::with_capacity(texts.len());
        for (text, embedding) in texts.iter().zip(embeddings) {
            let id = self.next_id;
            self.vectors.push(embedding.clone());
            self.document_map.insert(id, text.clone());
            self.next_id += 1;
            ids.push(id);
        }
        debug!(added = ids.len(), total = self.len(), "added documents");
        Ok(ids)
    }

    /// Exact nearest-neighbor search, ascending by squared-L2 distance,
    /// truncated to `k`. Distance ties break by ascending document ID so
    /// results are deterministic. An empty store yields an empty result,
    /// not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, VectorStoreError> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut hits: Vec<SearchHit> = self
            .document_map
            .iter()
            .zip(&self.vectors)
            .map(|((id, text), vector)| SearchHit {
                id: *id,
                text: text.clone(),
                distance: squared_l2(query, vector),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Writes the index and document map into `directory` as a snapshot.
    /// The directory is created if missing; an existing snapshot there is
    /// overwritten.
    #[instrument(skip(self, directory), fields(documents = self.len()))]
    pub fn save(&self, directory: impl AsRef<Path>) -> Result<(), VectorStoreError> {
        let directory = directory.as_ref();
        std::fs::create_dir_all(directory)?;

        let index = serde_json::to_string(&IndexFile {
            dimension: self.dimension,
            vectors: self.vectors.clone(),
        })
        .map_err(|e| VectorStoreError::Corrupt(e.to_string()))?;
        std::fs::write(directory.join(INDEX_FILE), index)?;

        let docstore = serde_json::to_string(&DocstoreFile {
            document_map: self.document_map.clone(),
            next_id: self.next_id,
        })
        .map_err(|e| VectorStoreError::Corrupt(e.to_string()))?;
        std::fs::write(directory.join(DOCSTORE_FILE), docstore)?;

        info!(path = %directory.display(), "saved snapshot");
        Ok(())
    }

    /// Restores a store from a snapshot directory, fully replacing any
    /// in-memory state the caller held before.
    #[instrument]
    pub fn load(directory: impl AsRef<Path> + std::fmt::Debug) -> Result<Self, VectorStoreError> {
        let directory = directory.as_ref();
        let index_path = directory.join(INDEX_FILE);
        let docstore_path = directory.join(DOCSTORE_FILE);
        if !index_path.is_file() || !docstore_path.is_file() {
            return Err(VectorStoreError::SnapshotNotFound(directory.to_path_buf()));
        }

        let index: IndexFile = serde_json::from_str(&std::fs::read_to_string(index_path)?)
            .map_err(|e| VectorStoreError::Corrupt(format!("{INDEX_FILE}: {e}")))?;
        let docstore: DocstoreFile = serde_json::from_str(&std::fs::read_to_string(docstore_path)?)
            .map_err(|e| VectorStoreError::Corrupt(format!("{DOCSTORE_FILE}: {e}")))?;

        if index.vectors.len() != docstore.document_map.len() {
            return Err(VectorStoreError::Corrupt(format!(
                "{} vectors but {} documents",
                index.vectors.len(),
                docstore.document_map.len()
            )));
        }
        if let Some(bad) = index.vectors.iter().find(|v| v.len() != index.dimension) {
            return Err(VectorStoreError::Corrupt(format!(
                "vector of length {} in an index of dimension {}",
                bad.len(),
                index.dimension
            )));
        }

        info!(documents = docstore.document_map.len(), "loaded snapshot");
        Ok(Self {
            dimension: index.dimension,
            vectors: index.vectors,
            document_map: docstore.document_map,
            next_id: docstore.next_id,
        })
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
