//! Deterministic embedders with no model runtime.
//!
//! These embedders map inputs to fixed-dimension vectors using feature
//! hashing (text) and folded intensity histograms (images). They carry no
//! semantic model, but they are deterministic, fast, and produce vectors
//! whose cosine similarity still reflects surface similarity of the inputs.
//! That makes them the default for tests, offline development, and smoke
//! runs of the full pipeline without an inference endpoint.

use std::io::Cursor;

use async_trait::async_trait;
use image::ImageReader;

use crate::embedding::image_embedder::ImageEmbedder;
use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{KinemaError, Result};
use crate::vector::Vector;

/// FNV-1a, fixed here because hashed features must be stable across
/// processes and releases (stored vectors are compared against future
/// query vectors).
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Text embedder using signed feature hashing over character trigrams.
///
/// Each lowercase trigram is hashed into one of `dimension` buckets with a
/// hash-derived sign, and the bucket counts are L2-normalized. Identical
/// texts produce identical vectors; overlapping texts produce correlated
/// vectors.
#[derive(Debug, Clone)]
pub struct HashingTextEmbedder {
    dimension: usize,
}

impl HashingTextEmbedder {
    /// Create a hashing text embedder with the given output dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl TextEmbedder for HashingTextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut data = vec![0.0f32; self.dimension];
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            let hash = fnv1a(trigram.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            data[bucket] += sign;
        }

        let mut vector = Vector::new(data);
        vector.normalize();
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing-trigram"
    }
}

/// Image embedder folding per-channel intensity histograms into a
/// fixed-dimension vector.
///
/// The image is decoded, downsampled, and each (channel, intensity) count
/// is accumulated into bucket `(channel * 256 + intensity) % dimension`,
/// then L2-normalized. Decode failures are embedding errors.
#[derive(Debug, Clone)]
pub struct HistogramImageEmbedder {
    dimension: usize,
}

impl HistogramImageEmbedder {
    /// Create a histogram image embedder with the given output dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl ImageEmbedder for HistogramImageEmbedder {
    async fn embed(&self, image_path: &str) -> Result<Vector> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| KinemaError::embedding(format!("failed to read '{image_path}': {e}")))?;

        let decoded = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| KinemaError::embedding(format!("cannot sniff '{image_path}': {e}")))?
            .decode()
            .map_err(|e| KinemaError::embedding(format!("cannot decode '{image_path}': {e}")))?;

        // Downsample before counting so large posters cost the same as
        // thumbnails; the histogram shape barely changes.
        let small = decoded.thumbnail(64, 64).to_rgb8();

        let mut data = vec![0.0f32; self.dimension];
        for pixel in small.pixels() {
            for (channel, intensity) in pixel.0.iter().enumerate() {
                let index = channel * 256 + *intensity as usize;
                data[index % self.dimension] += 1.0;
            }
        }

        let mut vector = Vector::new(data);
        vector.normalize();
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "histogram-rgb"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_text_embedding_is_deterministic() {
        let embedder = HashingTextEmbedder::new(64);
        let a = embedder.embed("a thief enters dreams").await.unwrap();
        let b = embedder.embed("a thief enters dreams").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimension(), 64);
    }

    #[tokio::test]
    async fn test_distinct_texts_embed_differently() {
        let embedder = HashingTextEmbedder::new(64);
        let a = embedder.embed("space adventure epic").await.unwrap();
        let b = embedder.embed("quiet family drama").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_valid_input() {
        let embedder = HashingTextEmbedder::new(16);
        let vector = embedder.embed("").await.unwrap();
        assert_eq!(vector.dimension(), 16);
        assert!(vector.is_valid());
    }

    #[tokio::test]
    async fn test_image_embedding_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster.png");
        let mut img = image::RgbImage::new(8, 8);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgb([(x * 32) as u8, (y * 32) as u8, 128]);
        }
        img.save(&path).unwrap();

        let embedder = HistogramImageEmbedder::new(32);
        let a = embedder.embed(path.to_str().unwrap()).await.unwrap();
        let b = embedder.embed(path.to_str().unwrap()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimension(), 32);
        assert!((a.norm() - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_undecodable_file_is_embedding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.jpg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"this is not image data").unwrap();

        let embedder = HistogramImageEmbedder::new(32);
        let err = embedder.embed(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, KinemaError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_embedding_error() {
        let embedder = HistogramImageEmbedder::new(32);
        let err = embedder.embed("/no/such/poster.jpg").await.unwrap_err();
        assert!(matches!(err, KinemaError::Embedding(_)));
    }
}
