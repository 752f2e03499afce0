//! Vector store interface and collection management.
//!
//! The [`VectorStore`] trait mirrors the surface of a managed
//! vector-database API: named collections with a fixed dimension and
//! metric, batched upserts of `(id, vector, metadata)` points, and top-k
//! similarity queries returning scored matches with metadata attached.
//!
//! All durable state lives behind this trait. [`memory::MemoryVectorStore`]
//! is the in-process implementation; remote backends plug in by
//! implementing the same trait. The [`manager::IndexManager`] sits on top
//! and owns collection lifecycle, id sanitization, and upsert batching.

pub mod manager;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::vector::{DistanceMetric, Vector};

pub use self::manager::IndexManager;
pub use self::memory::MemoryVectorStore;

/// Description of an existing collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Declared dimension; immutable after creation.
    pub dimension: usize,
    /// Similarity metric fixed at creation.
    pub metric: DistanceMetric,
}

/// A single point submitted for upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertEntry {
    /// Point id; the key of record. Writing an existing id overwrites it.
    pub id: String,
    /// The point's vector; must match the collection dimension exactly.
    pub vector: Vector,
    /// Opaque metadata payload returned with query matches.
    pub metadata: Value,
}

impl UpsertEntry {
    /// Create a new upsert entry.
    pub fn new(id: impl Into<String>, vector: Vector, metadata: Value) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata,
        }
    }
}

/// A single query match: id, similarity score, and stored metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    /// Id of the matched point.
    pub id: String,
    /// Similarity score under the collection's metric (higher is closer).
    pub score: f32,
    /// Metadata stored with the point.
    pub metadata: Value,
}

/// Interface to a vector database backend.
///
/// Implementations must tolerate interleaved upserts from concurrent
/// callers under their own concurrency model; no external locking is added
/// by the callers. A query concurrent with ingestion may observe a
/// partially populated collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// List the names of all collections.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Create a collection with the given dimension and metric.
    ///
    /// Fails if the collection already exists; callers wanting idempotent
    /// behavior go through [`manager::IndexManager::ensure_collection`].
    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<()>;

    /// Describe an existing collection.
    async fn describe_collection(&self, name: &str) -> Result<CollectionInfo>;

    /// Insert or overwrite points in a collection.
    ///
    /// Every vector must match the collection dimension; a mismatch rejects
    /// the whole call without partial application within it.
    async fn upsert(&self, collection: &str, points: Vec<UpsertEntry>) -> Result<()>;

    /// Return up to `top_k` nearest neighbors of `vector`, ordered by
    /// descending score under the collection's metric.
    async fn query(&self, collection: &str, vector: &[f32], top_k: usize)
        -> Result<Vec<QueryMatch>>;
}
