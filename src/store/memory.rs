//! In-process vector store implementation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KinemaError, Result};
use crate::store::{CollectionInfo, QueryMatch, UpsertEntry, VectorStore};
use crate::vector::DistanceMetric;

#[derive(Serialize, Deserialize)]
struct StoredPoint {
    values: Vec<f32>,
    metadata: Value,
}

#[derive(Serialize, Deserialize)]
struct MemoryCollection {
    dimension: usize,
    metric: DistanceMetric,
    points: HashMap<String, StoredPoint>,
}

/// An in-memory [`VectorStore`] backend.
///
/// Collections live in a `RwLock`'d map; queries score every point with the
/// collection's metric (exhaustive scan, parallel above a size cutoff) and
/// return matches in descending score order. Ties are broken by id so the
/// order is stable within a query call. Upserting an existing id overwrites
/// it, which is also how sanitized-id collisions resolve (last write wins).
///
/// The whole store can be snapshotted to a JSON file and loaded back, which
/// is what the CLI uses to keep collections across invocations.
#[derive(Default)]
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryVectorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON snapshot file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = fs::File::open(path.as_ref())?;
        let collections: HashMap<String, MemoryCollection> =
            serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    /// Write the store to a JSON snapshot file, creating parent directories
    /// as needed.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), &*self.collections.read())?;
        Ok(())
    }

    /// Number of points currently held by a collection.
    pub fn point_count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read();
        let coll = collections
            .get(collection)
            .ok_or_else(|| KinemaError::collection(format!("unknown collection '{collection}'")))?;
        Ok(coll.points.len())
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        metric: DistanceMetric,
    ) -> Result<()> {
        if dimension == 0 {
            return Err(KinemaError::invalid_config(
                "collection dimension must be non-zero",
            ));
        }
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(KinemaError::collection(format!(
                "collection '{name}' already exists"
            )));
        }
        collections.insert(
            name.to_string(),
            MemoryCollection {
                dimension,
                metric,
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn describe_collection(&self, name: &str) -> Result<CollectionInfo> {
        let collections = self.collections.read();
        let coll = collections
            .get(name)
            .ok_or_else(|| KinemaError::collection(format!("unknown collection '{name}'")))?;
        Ok(CollectionInfo {
            name: name.to_string(),
            dimension: coll.dimension,
            metric: coll.metric,
        })
    }

    async fn upsert(&self, collection: &str, points: Vec<UpsertEntry>) -> Result<()> {
        let mut collections = self.collections.write();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| KinemaError::collection(format!("unknown collection '{collection}'")))?;

        // Validate the whole batch before touching the map, so a bad vector
        // cannot leave this call half-applied.
        for point in &points {
            point.vector.validate_dimension(coll.dimension)?;
        }

        for point in points {
            coll.points.insert(
                point.id,
                StoredPoint {
                    values: point.vector.data,
                    metadata: point.metadata,
                },
            );
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        let collections = self.collections.read();
        let coll = collections
            .get(collection)
            .ok_or_else(|| KinemaError::collection(format!("unknown collection '{collection}'")))?;

        if vector.len() != coll.dimension {
            return Err(KinemaError::dimension_mismatch(coll.dimension, vector.len()));
        }
        if top_k == 0 || coll.points.is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<(&String, &StoredPoint)> = coll.points.iter().collect();
        let vectors: Vec<&[f32]> = entries
            .iter()
            .map(|(_, point)| point.values.as_slice())
            .collect();
        let scores = coll.metric.batch_similarity_parallel(vector, &vectors)?;

        let mut matches: Vec<QueryMatch> = entries
            .into_iter()
            .zip(scores)
            .map(|((id, point), score)| QueryMatch {
                id: id.clone(),
                score,
                metadata: point.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(top_k);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::vector::Vector;

    fn entry(id: &str, values: Vec<f32>) -> UpsertEntry {
        UpsertEntry::new(id, Vector::new(values), json!({ "title": id }))
    }

    #[tokio::test]
    async fn test_create_describe_list() {
        let store = MemoryVectorStore::new();
        store
            .create_collection("movies", 3, DistanceMetric::Cosine)
            .await
            .unwrap();

        let info = store.describe_collection("movies").await.unwrap();
        assert_eq!(info.dimension, 3);
        assert_eq!(info.metric, DistanceMetric::Cosine);
        assert_eq!(store.list_collections().await.unwrap(), vec!["movies"]);

        // Creation is not idempotent at the store layer.
        assert!(store
            .create_collection("movies", 5, DistanceMetric::Cosine)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_query_orders_by_descending_score() {
        let store = MemoryVectorStore::new();
        store
            .create_collection("movies", 2, DistanceMetric::Cosine)
            .await
            .unwrap();
        store
            .upsert(
                "movies",
                vec![
                    entry("far", vec![0.0, 1.0]),
                    entry("near", vec![1.0, 0.05]),
                    entry("exact", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let matches = store.query("movies", &[1.0, 0.0], 10).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "near", "far"]);
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(matches[0].metadata["title"], "exact");
    }

    #[tokio::test]
    async fn test_query_truncates_to_top_k() {
        let store = MemoryVectorStore::new();
        store
            .create_collection("movies", 2, DistanceMetric::Cosine)
            .await
            .unwrap();
        store
            .upsert(
                "movies",
                (0..5)
                    .map(|i| entry(&format!("m{i}"), vec![1.0, i as f32 * 0.1]))
                    .collect(),
            )
            .await
            .unwrap();

        assert_eq!(store.query("movies", &[1.0, 0.0], 2).await.unwrap().len(), 2);
        assert!(store.query("movies", &[1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_id() {
        let store = MemoryVectorStore::new();
        store
            .create_collection("movies", 2, DistanceMetric::Cosine)
            .await
            .unwrap();
        store
            .upsert("movies", vec![entry("Amelie", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert("movies", vec![entry("Amelie", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.point_count("movies").unwrap(), 1);
        let matches = store.query("movies", &[0.0, 1.0], 1).await.unwrap();
        assert!((matches[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = MemoryVectorStore::new();
        store
            .create_collection("movies", 3, DistanceMetric::Cosine)
            .await
            .unwrap();

        let err = store
            .upsert("movies", vec![entry("short", vec![1.0, 2.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, KinemaError::DimensionMismatch { .. }));

        let err = store.query("movies", &[1.0, 2.0], 5).await.unwrap_err();
        assert!(matches!(
            err,
            KinemaError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_collection() {
        let store = MemoryVectorStore::new();
        assert!(store.describe_collection("nope").await.is_err());
        assert!(store.query("nope", &[1.0], 5).await.is_err());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots").join("movies.json");

        let store = MemoryVectorStore::new();
        store
            .create_collection("movies", 2, DistanceMetric::Cosine)
            .await
            .unwrap();
        store
            .upsert("movies", vec![entry("Inception", vec![1.0, 0.0])])
            .await
            .unwrap();
        store.save_to_path(&path).unwrap();

        let restored = MemoryVectorStore::load_from_path(&path).unwrap();
        let info = restored.describe_collection("movies").await.unwrap();
        assert_eq!(info.dimension, 2);
        let matches = restored.query("movies", &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(matches[0].id, "Inception");
    }
}
