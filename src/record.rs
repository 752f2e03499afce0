//! Movie record data model.
//!
//! A [`MovieRecord`] is the unit of ingestion: metadata scraped from a movie
//! catalog plus a reference to a local poster asset. Genres and cast are
//! typed ordered sequences end-to-end; the `", "`-joined string form used by
//! CSV persistence exists only at the serialization boundary (see
//! [`join_list`] / [`split_list`] and the [`crate::feed`] module).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// The delimiter used for list-valued fields in flat (CSV) persistence.
pub const LIST_DELIMITER: &str = ", ";

/// A single movie record, immutable once upserted except by re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    /// Record identifier; the movie title at construction time. The key of
    /// record in the vector store is the ASCII-sanitized form of this id.
    pub id: String,
    /// Movie title.
    pub title: String,
    /// Plot overview; the text that gets embedded.
    pub overview: String,
    /// Genre names, in catalog order.
    pub genres: Vec<String>,
    /// Top-billed cast names, in credit order.
    pub cast: Vec<String>,
    /// Path to the downloaded poster image, if one was resolved.
    pub poster_path: Option<String>,
}

impl MovieRecord {
    /// Create a record from catalog fields, using the title as the id.
    pub fn new(
        title: impl Into<String>,
        overview: impl Into<String>,
        genres: Vec<String>,
        cast: Vec<String>,
        poster_path: Option<String>,
    ) -> Self {
        let title = title.into();
        Self {
            id: title.clone(),
            title,
            overview: overview.into(),
            genres,
            cast,
            poster_path,
        }
    }

    /// Convert this record into the metadata payload stored alongside its
    /// vector. Lists stay lists here; only flat formats join them.
    pub fn to_metadata(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Reconstruct a record from a stored metadata payload.
    pub fn from_metadata(metadata: Value) -> Result<Self> {
        Ok(serde_json::from_value(metadata)?)
    }
}

/// Join a list field into its flat string representation.
pub fn join_list(values: &[String]) -> String {
    values.join(LIST_DELIMITER)
}

/// Split a flat string representation back into a list field.
///
/// An empty string yields an empty list, not a list with one empty entry.
pub fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(LIST_DELIMITER).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MovieRecord {
        MovieRecord::new(
            "Inception",
            "A thief who steals corporate secrets through dream-sharing.",
            vec!["Sci-Fi".to_string(), "Action".to_string()],
            vec!["Leonardo DiCaprio".to_string()],
            Some("posters/Inception.jpg".to_string()),
        )
    }

    #[test]
    fn test_new_uses_title_as_id() {
        let record = sample_record();
        assert_eq!(record.id, "Inception");
        assert_eq!(record.title, "Inception");
    }

    #[test]
    fn test_metadata_round_trip() {
        let record = sample_record();
        let metadata = record.to_metadata().unwrap();
        // Lists stay JSON arrays in metadata, never joined strings.
        assert!(metadata["genres"].is_array());
        let restored = MovieRecord::from_metadata(metadata).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_join_and_split_list() {
        let genres = vec!["Sci-Fi".to_string(), "Action".to_string()];
        let joined = join_list(&genres);
        assert_eq!(joined, "Sci-Fi, Action");
        assert_eq!(split_list(&joined), genres);
    }

    #[test]
    fn test_split_empty_string() {
        assert!(split_list("").is_empty());
    }
}
