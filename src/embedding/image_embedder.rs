//! Image embedding trait for Kinema's multimodal search pipeline.

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::Vector;

/// Trait for converting images to vector embeddings.
///
/// Implementations take a path to an image file on disk. The referenced
/// file must be a decodable image; decode failures are embedding errors,
/// while a missing file is an asset error handled before embedding by the
/// ingestion pipeline.
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Generate an embedding vector for the given image.
    async fn embed(&self, image_path: &str) -> Result<Vector>;

    /// Generate embeddings for multiple images in batch.
    ///
    /// The default implementation calls `embed` sequentially. Override this
    /// method for better performance with batch processing.
    async fn embed_batch(&self, image_paths: &[&str]) -> Result<Vec<Vector>> {
        let mut results = Vec::with_capacity(image_paths.len());
        for path in image_paths {
            results.push(self.embed(path).await?);
        }
        Ok(results)
    }

    /// Get the dimension of generated embeddings.
    fn dimension(&self) -> usize;

    /// Get the name/identifier of this embedder, for logging and debugging.
    fn name(&self) -> &str {
        "unknown"
    }
}
