//! Ingestion pipeline: source records to upserted vectors.
//!
//! Each record moves through a small lifecycle:
//!
//! ```text
//! Pending -> Embedding -> Sanitized -> Batched -> Upserted
//!                 \-> EmbeddingFailed
//!          \-> SkippedMissingAsset
//! ```
//!
//! Records with a missing or unopenable poster asset are skipped; records
//! whose embedding fails are excluded with the reason logged. Neither
//! aborts the run. Only records that reach `Batched` are included in
//! upsert requests, in fixed-size batches that flush as embeddings
//! complete — submission order is independent of input order.
//!
//! The collection is established exactly once before any upsert. The
//! fusion dimension is offered as a hint; if a pre-existing collection
//! reports a different effective dimension the run fails fast, since
//! vectors cannot be adapted to another width.

use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::embedding::FusionEmbedder;
use crate::error::{KinemaError, Result};
use crate::record::MovieRecord;
use crate::store::{IndexManager, UpsertEntry};
use crate::vector::DistanceMetric;

/// Configuration for an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Target collection name.
    pub collection: String,
    /// Metric requested if the collection has to be created.
    pub metric: DistanceMetric,
    /// Maximum records embedded concurrently.
    pub concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            collection: "movies".to_string(),
            metric: DistanceMetric::Cosine,
            concurrency: num_cpus::get(),
        }
    }
}

/// Lifecycle phase of a record within an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestPhase {
    /// Not yet picked up.
    Pending,
    /// Embedding in progress.
    Embedding,
    /// Embedded; id sanitization applies at upsert time.
    Sanitized,
    /// Assembled into an upsert batch.
    Batched,
    /// Committed to the collection.
    Upserted,
    /// Terminal: embedding generation failed.
    EmbeddingFailed,
    /// Terminal: poster asset absent or unopenable.
    SkippedMissingAsset,
}

/// Final state of one record after an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// Record id (pre-sanitization).
    pub id: String,
    /// Terminal phase the record reached.
    pub phase: IngestPhase,
    /// Failure reason, for the failure phases.
    pub error: Option<String>,
}

/// Summary of an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of source records offered.
    pub total: usize,
    /// Effective dimension of the target collection.
    pub dimension: usize,
    /// Per-record terminal states.
    pub outcomes: Vec<RecordOutcome>,
}

impl IngestReport {
    /// Records committed to the collection.
    pub fn upserted(&self) -> usize {
        self.count(IngestPhase::Upserted)
    }

    /// Records skipped for a missing asset.
    pub fn skipped(&self) -> usize {
        self.count(IngestPhase::SkippedMissingAsset)
    }

    /// Records excluded by an embedding failure.
    pub fn failed(&self) -> usize {
        self.count(IngestPhase::EmbeddingFailed)
    }

    fn count(&self, phase: IngestPhase) -> usize {
        self.outcomes.iter().filter(|o| o.phase == phase).count()
    }
}

enum EmbedResult {
    Embedded(MovieRecord, UpsertEntry),
    Skipped(RecordOutcome),
    Failed(RecordOutcome),
}

/// Batch ingestion of movie records into a vector collection.
///
/// The pipeline holds no persistent state; it borrows an explicitly
/// constructed fusion encoder and index manager and leaves all durable
/// state in the vector store.
pub struct IngestPipeline {
    fusion: Arc<FusionEmbedder>,
    manager: Arc<IndexManager>,
    config: IngestConfig,
}

impl IngestPipeline {
    /// Create a pipeline from its collaborators.
    pub fn new(fusion: Arc<FusionEmbedder>, manager: Arc<IndexManager>, config: IngestConfig) -> Self {
        Self {
            fusion,
            manager,
            config,
        }
    }

    /// Ingest a batch of records, returning the per-record report.
    ///
    /// Per-record failures are logged and recorded, never fatal. A backend
    /// failure while flushing a batch is fatal for the remainder of the
    /// run; batches already flushed stay committed.
    pub async fn run(&self, records: Vec<MovieRecord>) -> Result<IngestReport> {
        let total = records.len();
        let dimension = self.fusion.dimension();
        let effective = self
            .manager
            .ensure_collection(&self.config.collection, dimension, self.config.metric)
            .await?;
        if effective != dimension {
            return Err(KinemaError::dimension_mismatch(effective, dimension));
        }

        let concurrency = self.config.concurrency.max(1);
        let fusion = &self.fusion;
        let mut results = stream::iter(records.into_iter().map(|record| async move {
            embed_record(fusion, record).await
        }))
        .buffer_unordered(concurrency);

        let mut outcomes: Vec<RecordOutcome> = Vec::with_capacity(total);
        let mut batch: Vec<(String, UpsertEntry)> = Vec::new();
        let batch_size = self.manager.batch_size();

        while let Some(result) = results.next().await {
            match result {
                EmbedResult::Embedded(record, entry) => {
                    entry.vector.validate_dimension(effective)?;
                    batch.push((record.id, entry));
                    if batch.len() >= batch_size {
                        self.flush(&mut batch, &mut outcomes).await?;
                    }
                }
                EmbedResult::Skipped(outcome) | EmbedResult::Failed(outcome) => {
                    outcomes.push(outcome);
                }
            }
        }
        self.flush(&mut batch, &mut outcomes).await?;

        let report = IngestReport {
            total,
            dimension: effective,
            outcomes,
        };
        info!(
            "ingested {}/{} records into '{}' ({} skipped, {} failed)",
            report.upserted(),
            report.total,
            self.config.collection,
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    async fn flush(
        &self,
        batch: &mut Vec<(String, UpsertEntry)>,
        outcomes: &mut Vec<RecordOutcome>,
    ) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let drained: Vec<(String, UpsertEntry)> = batch.drain(..).collect();
        let (ids, entries): (Vec<String>, Vec<UpsertEntry>) = drained.into_iter().unzip();
        self.manager
            .upsert_batch(&self.config.collection, entries)
            .await?;
        outcomes.extend(ids.into_iter().map(|id| RecordOutcome {
            id,
            phase: IngestPhase::Upserted,
            error: None,
        }));
        Ok(())
    }
}

async fn embed_record(fusion: &FusionEmbedder, record: MovieRecord) -> EmbedResult {
    let poster = match &record.poster_path {
        Some(path) => path.clone(),
        None => {
            warn!("skipping '{}': no poster reference", record.id);
            return EmbedResult::Skipped(RecordOutcome {
                id: record.id,
                phase: IngestPhase::SkippedMissingAsset,
                error: Some("no poster reference".to_string()),
            });
        }
    };

    // Missing or unopenable assets skip the record; failures past this
    // point (decode, encoder) count as embedding failures.
    if let Err(e) = tokio::fs::File::open(Path::new(&poster)).await {
        warn!("skipping '{}': poster '{poster}' unavailable: {e}", record.id);
        return EmbedResult::Skipped(RecordOutcome {
            id: record.id,
            phase: IngestPhase::SkippedMissingAsset,
            error: Some(format!("poster '{poster}' unavailable: {e}")),
        });
    }

    match fusion.fuse(&record.overview, &poster).await {
        Ok(vector) => match record.to_metadata() {
            Ok(metadata) => {
                let entry = UpsertEntry::new(record.id.clone(), vector, metadata);
                EmbedResult::Embedded(record, entry)
            }
            Err(e) => EmbedResult::Failed(RecordOutcome {
                id: record.id,
                phase: IngestPhase::EmbeddingFailed,
                error: Some(format!("metadata serialization failed: {e}")),
            }),
        },
        Err(e) => {
            warn!("embedding failed for '{}': {e}", record.id);
            EmbedResult::Failed(RecordOutcome {
                id: record.id,
                phase: IngestPhase::EmbeddingFailed,
                error: Some(e.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let report = IngestReport {
            total: 3,
            dimension: 4,
            outcomes: vec![
                RecordOutcome {
                    id: "a".into(),
                    phase: IngestPhase::Upserted,
                    error: None,
                },
                RecordOutcome {
                    id: "b".into(),
                    phase: IngestPhase::SkippedMissingAsset,
                    error: Some("no poster reference".into()),
                },
                RecordOutcome {
                    id: "c".into(),
                    phase: IngestPhase::EmbeddingFailed,
                    error: Some("cannot decode".into()),
                },
            ],
        };
        assert_eq!(report.upserted(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.collection, "movies");
        assert_eq!(config.metric, DistanceMetric::Cosine);
        assert!(config.concurrency >= 1);
    }
}
