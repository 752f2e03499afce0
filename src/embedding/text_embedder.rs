//! Text embedding trait for Kinema's multimodal search pipeline.

use async_trait::async_trait;

use crate::error::Result;
use crate::vector::Vector;

/// Trait for converting text to vector embeddings.
///
/// This trait provides a common interface for various embedding methods
/// (local models, API-based services, deterministic hashing) to plug into
/// the fusion and ingestion layers.
///
/// # Custom implementation
///
/// ```
/// use async_trait::async_trait;
/// use kinema::embedding::text_embedder::TextEmbedder;
/// use kinema::error::Result;
/// use kinema::vector::Vector;
///
/// struct MyEmbedder {
///     dimension: usize,
/// }
///
/// #[async_trait]
/// impl TextEmbedder for MyEmbedder {
///     async fn embed(&self, text: &str) -> Result<Vector> {
///         Ok(Vector::new(vec![0.0; self.dimension]))
///     }
///
///     fn dimension(&self) -> usize {
///         self.dimension
///     }
/// }
/// ```
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Generate an embedding vector for the given text.
    ///
    /// Empty input is valid and must produce a vector of the declared
    /// dimension like any other input.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Generate embeddings for multiple texts in batch.
    ///
    /// The default implementation calls `embed` sequentially. Override this
    /// method for better performance with batch processing.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
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
