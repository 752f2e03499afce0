//! Core vector data structures for similarity search.
//!
//! This module provides the dense [`Vector`] value type shared by the
//! embedding and store layers, and the [`DistanceMetric`] used to score
//! nearest-neighbor candidates.

pub mod distance;
pub mod vector;

pub use self::distance::DistanceMetric;
pub use self::vector::Vector;
