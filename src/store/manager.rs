//! Collection lifecycle and write-path management.

use std::sync::Arc;

use log::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::{KinemaError, Result};
use crate::store::{QueryMatch, UpsertEntry, VectorStore};
use crate::vector::DistanceMetric;

/// Default number of points per upsert request, sized to stay under typical
/// backend payload limits.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Transliterate an id to its closest ASCII equivalent.
///
/// Non-ASCII characters are decomposed (NFKD) and any remaining non-ASCII
/// code points are dropped. Ids that are already pure ASCII come back
/// unchanged. Two distinct ids may sanitize to the same string
/// ("Amélie"/"Amelie"); the collision is not detected and the later upsert
/// overwrites the earlier one.
pub fn sanitize_id(id: &str) -> String {
    if id.is_ascii() {
        return id.to_string();
    }
    id.nfkd().filter(char::is_ascii).collect()
}

/// Owns the lifecycle of named vector collections and the write path into
/// them.
///
/// The manager is the only component that creates or describes collections.
/// Pipelines hold a manager and stay stateless themselves; all durable
/// state lives in the backing [`VectorStore`].
pub struct IndexManager {
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl IndexManager {
    /// Create a manager over an explicitly passed store handle.
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the upsert batch size (must be non-zero).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        debug_assert!(batch_size > 0);
        self.batch_size = batch_size.max(1);
        self
    }

    /// The configured upsert batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Ensure the named collection exists and return its effective
    /// dimension.
    ///
    /// If the collection does not exist it is created with the requested
    /// dimension and metric. If it does exist, the request is ignored and
    /// the stored dimension is returned (first-write-wins reconciliation).
    /// Callers must adapt to the returned value rather than assume their
    /// request was honored.
    pub async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<usize> {
        let existing = self.store.list_collections().await?;
        if !existing.iter().any(|n| n == name) {
            self.store.create_collection(name, dimension, metric).await?;
            debug!("created collection '{name}' with dimension {dimension}");
            return Ok(dimension);
        }

        let info = self.store.describe_collection(name).await?;
        if info.dimension != dimension {
            warn!(
                "collection '{name}' already exists with dimension {}; requested {dimension} ignored",
                info.dimension
            );
        }
        Ok(info.dimension)
    }

    /// Upsert entries in batches of at most `batch_size`, sanitizing every
    /// id first. Returns the number of entries committed.
    ///
    /// Batches are independent: a failure in batch N leaves batches 1..N-1
    /// committed (at-least-once, not atomic) and surfaces an error naming
    /// how many entries made it in.
    pub async fn upsert_batch(&self, name: &str, entries: Vec<UpsertEntry>) -> Result<usize> {
        let total = entries.len();
        let sanitized: Vec<UpsertEntry> = entries
            .into_iter()
            .map(|mut entry| {
                let clean = sanitize_id(&entry.id);
                if clean != entry.id {
                    debug!("sanitized id '{}' -> '{clean}'", entry.id);
                    entry.id = clean;
                }
                entry
            })
            .collect();

        let mut committed = 0usize;
        for chunk in sanitized.chunks(self.batch_size) {
            self.store
                .upsert(name, chunk.to_vec())
                .await
                .map_err(|e| {
                    KinemaError::backend(format!(
                        "upsert into '{name}' failed after {committed}/{total} entries: {e}"
                    ))
                })?;
            committed += chunk.len();
        }
        Ok(committed)
    }

    /// Top-k similarity query against the named collection.
    pub async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        self.store.query(name, vector, top_k).await
    }

    /// Effective dimension of an existing collection.
    pub async fn dimension(&self, name: &str) -> Result<usize> {
        Ok(self.store.describe_collection(name).await?.dimension)
    }
}
