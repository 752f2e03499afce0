//! Embedding support for multimodal vector search.
//!
//! This module provides trait-based interfaces for converting text and
//! images to vector embeddings, and the fusion encoder that concatenates
//! both modalities into one composite vector.
//!
//! Kinema treats encoder models as black-box collaborators behind the
//! [`TextEmbedder`] and [`ImageEmbedder`] traits:
//!
//! - [`hashing`] - deterministic, dependency-light embedders (feature
//!   hashing for text, decoded pixel statistics for images). Always
//!   available; used by tests and offline runs.
//! - [`remote`] - HTTP inference-endpoint embedders for model-backed
//!   deployments (sentence encoders, CLIP-style image encoders).
//!
//! Swapping encoder pairs changes the composite dimension and invalidates
//! previously stored vectors; no migration path is provided.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use kinema::embedding::FusionEmbedder;
//! use kinema::embedding::hashing::{HashingTextEmbedder, HistogramImageEmbedder};
//!
//! let fusion = FusionEmbedder::new(
//!     Arc::new(HashingTextEmbedder::new(768)),
//!     Arc::new(HistogramImageEmbedder::new(512)),
//! );
//! assert_eq!(fusion.dimension(), 1280);
//! ```

pub mod fusion;
pub mod hashing;
pub mod image_embedder;
pub mod remote;
pub mod text_embedder;

pub use self::fusion::FusionEmbedder;
pub use self::image_embedder::ImageEmbedder;
pub use self::text_embedder::TextEmbedder;
