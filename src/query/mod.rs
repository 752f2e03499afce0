//! Query pipeline: multimodal search requests to ranked matches.
//!
//! A search request carries both modalities — query text and a query image
//! — and is rejected before any store call if either is missing. Text-only
//! and image-only search would require storing the halves separately or
//! padding the composite; neither is supported by this pipeline and both
//! are left as an extension.
//!
//! The fused query vector must match the collection's effective dimension
//! (established at ingestion time); a mismatch is fatal for the request,
//! never silently truncated or padded.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::embedding::FusionEmbedder;
use crate::error::{KinemaError, Result};
use crate::record::MovieRecord;
use crate::store::IndexManager;

/// Default number of matches returned by a search.
pub const DEFAULT_TOP_K: usize = 10;

/// A multimodal search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query text. Required; must be non-empty.
    pub text: String,
    /// Path to the query image. Required.
    pub image_path: String,
    /// Maximum number of matches to return.
    pub top_k: usize,
}

impl SearchRequest {
    /// Create a request with the default result limit.
    pub fn new(text: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_path: image_path.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the result limit.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// A ranked search match with the stored movie metadata attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieMatch {
    /// Sanitized id of the matched record.
    pub id: String,
    /// Similarity score; matches are ordered by descending score.
    pub score: f32,
    /// The movie metadata stored at ingestion time.
    pub record: MovieRecord,
}

/// Multimodal top-k search against a movie collection.
pub struct SearchPipeline {
    fusion: Arc<FusionEmbedder>,
    manager: Arc<IndexManager>,
    collection: String,
}

impl SearchPipeline {
    /// Create a pipeline from its collaborators and target collection.
    pub fn new(
        fusion: Arc<FusionEmbedder>,
        manager: Arc<IndexManager>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            fusion,
            manager,
            collection: collection.into(),
        }
    }

    /// Execute a search, returning at most `top_k` matches ordered by
    /// descending similarity.
    ///
    /// Fails with an invalid-query error when a modality is missing, and
    /// with a dimension-mismatch error when the fused query vector does not
    /// match the collection's effective dimension.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<MovieMatch>> {
        if request.text.trim().is_empty() {
            return Err(KinemaError::invalid_query("missing text modality"));
        }
        if request.image_path.is_empty() {
            return Err(KinemaError::invalid_query("missing image modality"));
        }
        if request.top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .fusion
            .fuse(&request.text, &request.image_path)
            .await?;

        let effective = self.manager.dimension(&self.collection).await?;
        query_vector.validate_dimension(effective)?;

        let matches = self
            .manager
            .query(&self.collection, &query_vector.data, request.top_k)
            .await?;
        debug!(
            "query against '{}' returned {} matches",
            self.collection,
            matches.len()
        );

        matches
            .into_iter()
            .map(|m| {
                let record = MovieRecord::from_metadata(m.metadata)?;
                Ok(MovieMatch {
                    id: m.id,
                    score: m.score,
                    record,
                })
            })
            .collect()
    }
}
