//! In-memory graph store for testing and the CLI tool.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::types::ProcessGraph;
use super::GraphStore;

/// Error type for in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Store is read-only.
    #[error("Store is read-only")]
    ReadOnly,
}

/// One saved process map.
#[derive(Debug, Clone)]
struct StoredDocument {
    /// Graph serialized as JSON, as a document database would hold it.
    body: Vec<u8>,
    /// Monotonic per-map revision, starting at 1.
    revision: u64,
    /// When this revision was written.
    saved_at: DateTime<Utc>,
}

/// In-memory graph store.
///
/// Documents are kept as JSON bytes so loads always hand back a fresh,
/// unaliased graph. Uses a BTreeMap for deterministic iteration order.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    documents: RwLock<BTreeMap<String, StoredDocument>>,
    read_only: RwLock<bool>,
}

impl InMemoryGraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject all subsequent saves with [`InMemoryError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.write() = read_only;
    }

    /// Insert a raw JSON document, bypassing serialization.
    pub fn put_raw(&self, map_id: impl Into<String>, body: impl Into<Vec<u8>>) {
        let mut documents = self.documents.write();
        let map_id = map_id.into();
        let revision = documents.get(&map_id).map_or(1, |d| d.revision + 1);
        documents.insert(map_id, StoredDocument {
            body: body.into(),
            revision,
            saved_at: Utc::now(),
        });
    }

    /// Current revision of a map, if saved.
    pub fn revision(&self, map_id: &str) -> Option<u64> {
        self.documents.read().get(map_id).map(|d| d.revision)
    }

    /// When a map was last saved.
    pub fn saved_at(&self, map_id: &str) -> Option<DateTime<Utc>> {
        self.documents.read().get(map_id).map(|d| d.saved_at)
    }

    /// Ids of all saved maps.
    pub fn map_ids(&self) -> Vec<String> {
        self.documents.read().keys().cloned().collect()
    }

    /// Number of saved maps.
    pub fn num_maps(&self) -> usize {
        self.documents.read().len()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    type Error = InMemoryError;

    async fn load(&self, map_id: &str) -> Result<Option<ProcessGraph>, Self::Error> {
        let documents = self.documents.read();
        documents
            .get(map_id)
            .map(|doc| {
                serde_json::from_slice(&doc.body)
                    .map_err(|e| InMemoryError::Serialization(e.to_string()))
            })
            .transpose()
    }

    async fn save(&self, map_id: &str, graph: &ProcessGraph) -> Result<(), Self::Error> {
        if *self.read_only.read() {
            return Err(InMemoryError::ReadOnly);
        }

        let body = serde_json::to_vec(graph)
            .map_err(|e| InMemoryError::Serialization(e.to_string()))?;
        self.put_raw(map_id, body);

        tracing::debug!(
            map_id = %map_id,
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            "Saved process map"
        );
        Ok(())
    }
}
