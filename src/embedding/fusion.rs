//! Fusion of text and image embeddings into one composite vector.

use std::sync::Arc;

use futures::try_join;

use crate::embedding::image_embedder::ImageEmbedder;
use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{KinemaError, Result};
use crate::vector::Vector;

/// Combines a text embedder and an image embedder into a single encoder
/// producing composite vectors by concatenation.
///
/// The ordering is a fixed contract: text components first, image
/// components second. The composite dimension is therefore
/// `text.dimension() + image.dimension()`, and it defines the
/// dimensionality of any collection populated through this encoder.
///
/// No weighting or re-normalization is applied beyond whatever the
/// underlying encoders already produce.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use kinema::embedding::FusionEmbedder;
/// use kinema::embedding::hashing::{HashingTextEmbedder, HistogramImageEmbedder};
///
/// let fusion = FusionEmbedder::new(
///     Arc::new(HashingTextEmbedder::new(768)),
///     Arc::new(HistogramImageEmbedder::new(512)),
/// );
/// assert_eq!(fusion.dimension(), 768 + 512);
/// ```
pub struct FusionEmbedder {
    text: Arc<dyn TextEmbedder>,
    image: Arc<dyn ImageEmbedder>,
}

impl FusionEmbedder {
    /// Create a fusion encoder from explicitly passed embedder handles.
    pub fn new(text: Arc<dyn TextEmbedder>, image: Arc<dyn ImageEmbedder>) -> Self {
        Self { text, image }
    }

    /// The composite dimension: text dimension plus image dimension.
    pub fn dimension(&self) -> usize {
        self.text.dimension() + self.image.dimension()
    }

    /// Dimension of the text half of the composite.
    pub fn text_dimension(&self) -> usize {
        self.text.dimension()
    }

    /// Dimension of the image half of the composite.
    pub fn image_dimension(&self) -> usize {
        self.image.dimension()
    }

    /// Embed both modalities independently and concatenate text-first.
    ///
    /// If either sub-embedding fails, the whole fusion fails; no partial or
    /// degraded vector is produced. The text may be empty, but the image
    /// path must reference a decodable image.
    pub async fn fuse(&self, text: &str, image_path: &str) -> Result<Vector> {
        let (text_vector, image_vector) =
            try_join!(self.text.embed(text), self.image.embed(image_path))?;

        text_vector.validate_dimension(self.text.dimension())?;
        image_vector.validate_dimension(self.image.dimension())?;

        let fused = text_vector.concat(&image_vector);
        if !fused.is_valid() {
            return Err(KinemaError::embedding(format!(
                "fused vector for '{image_path}' contains non-finite values"
            )));
        }
        Ok(fused)
    }
}

impl std::fmt::Debug for FusionEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionEmbedder")
            .field("text", &self.text.name())
            .field("image", &self.image.name())
            .field("dimension", &self.dimension())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    /// Embedder returning a constant vector, for ordering checks.
    struct ConstTextEmbedder(Vec<f32>);

    #[async_trait]
    impl TextEmbedder for ConstTextEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vector> {
            Ok(Vector::new(self.0.clone()))
        }

        fn dimension(&self) -> usize {
            self.0.len()
        }
    }

    struct ConstImageEmbedder(Vec<f32>);

    #[async_trait]
    impl ImageEmbedder for ConstImageEmbedder {
        async fn embed(&self, _image_path: &str) -> Result<Vector> {
            Ok(Vector::new(self.0.clone()))
        }

        fn dimension(&self) -> usize {
            self.0.len()
        }
    }

    struct FailingImageEmbedder;

    #[async_trait]
    impl ImageEmbedder for FailingImageEmbedder {
        async fn embed(&self, image_path: &str) -> Result<Vector> {
            Err(KinemaError::embedding(format!("cannot decode {image_path}")))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_fuse_concatenates_text_first() {
        let fusion = FusionEmbedder::new(
            Arc::new(ConstTextEmbedder(vec![1.0, 2.0])),
            Arc::new(ConstImageEmbedder(vec![3.0, 4.0, 5.0])),
        );

        let fused = fusion.fuse("dream heist", "poster.jpg").await.unwrap();
        assert_eq!(fused.data, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(fused.dimension(), fusion.dimension());

        // Swapping the halves yields a different vector: the ordering is a
        // fixed contract, not arbitrary.
        let swapped = FusionEmbedder::new(
            Arc::new(ConstTextEmbedder(vec![3.0, 4.0, 5.0])),
            Arc::new(ConstImageEmbedder(vec![1.0, 2.0])),
        );
        let other = swapped.fuse("dream heist", "poster.jpg").await.unwrap();
        assert_ne!(fused.data, other.data);
    }

    #[tokio::test]
    async fn test_fuse_fails_when_sub_embedding_fails() {
        let fusion = FusionEmbedder::new(
            Arc::new(ConstTextEmbedder(vec![1.0])),
            Arc::new(FailingImageEmbedder),
        );

        let err = fusion.fuse("text", "broken.jpg").await.unwrap_err();
        match err {
            KinemaError::Embedding(msg) => assert!(msg.contains("broken.jpg")),
            other => panic!("expected embedding error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_fuse_accepts_empty_text() {
        let fusion = FusionEmbedder::new(
            Arc::new(ConstTextEmbedder(vec![0.5])),
            Arc::new(ConstImageEmbedder(vec![0.25])),
        );
        let fused = fusion.fuse("", "poster.jpg").await.unwrap();
        assert_eq!(fused.dimension(), 2);
    }
}
