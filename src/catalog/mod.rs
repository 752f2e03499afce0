//! Movie catalog HTTP client.
//!
//! Fetches movie metadata and poster images from a TMDB-style catalog API:
//! paged discovery, genre-id resolution, and top-billed cast lookup, plus
//! poster downloads named by the shared filename convention
//! ([`crate::feed::poster_filename`]).
//!
//! This is boundary glue in front of the ingestion pipeline; failures here
//! are surfaced per request, with a bounded retry/backoff applied at this
//! layer only (the core pipelines never retry).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{KinemaError, Result};
use crate::feed::poster_filename;
use crate::record::MovieRecord;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const MAX_ATTEMPTS: u32 = 5;
const BACKOFF: Duration = Duration::from_millis(100);

/// How many cast members to keep per movie.
const TOP_CAST: usize = 5;

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    results: Vec<DiscoverMovie>,
}

#[derive(Debug, Deserialize)]
struct DiscoverMovie {
    id: u64,
    title: String,
    overview: String,
    #[serde(default)]
    genre_ids: Vec<u64>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
}

/// Client for a TMDB-style movie catalog.
pub struct CatalogClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

impl CatalogClient {
    /// Create a client against the default catalog endpoints.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(100)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (primarily for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the image base URL.
    pub fn with_image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.image_base_url = image_base_url.into();
        self
    }

    /// Fetch `pages` pages of the discovery listing and assemble full
    /// records: genre names resolved, top cast attached, poster reference
    /// pointing at the image CDN.
    pub async fn fetch_records(&self, pages: u32) -> Result<Vec<MovieRecord>> {
        let genre_names = self.genre_names().await?;

        let mut records = Vec::new();
        for page in 1..=pages {
            let url = format!("{}/discover/movie", self.base_url);
            let response: DiscoverResponse = self
                .get_json(&url, &[("page", page.to_string())])
                .await?;
            info!("fetched discovery page {page} ({} movies)", response.results.len());

            for movie in response.results {
                let cast = self.top_cast(movie.id).await?;
                records.push(assemble_record(
                    movie,
                    &genre_names,
                    cast,
                    &self.image_base_url,
                ));
            }
        }
        Ok(records)
    }

    /// Download each record's poster into `output_dir`, named by the shared
    /// filename convention. Records without a poster reference are skipped;
    /// individual download failures are logged and skipped. Returns the
    /// number of posters written.
    pub async fn download_posters<P: AsRef<Path>>(
        &self,
        records: &[MovieRecord],
        output_dir: P,
    ) -> Result<usize> {
        let output_dir = output_dir.as_ref();
        tokio::fs::create_dir_all(output_dir).await?;

        let mut downloaded = 0usize;
        for record in records {
            let Some(url) = &record.poster_path else {
                continue;
            };
            match self.fetch_bytes(url).await {
                Ok(bytes) => {
                    let path = output_dir.join(poster_filename(&record.title));
                    tokio::fs::write(&path, &bytes).await?;
                    downloaded += 1;
                }
                Err(e) => {
                    warn!("error downloading poster for '{}': {e}", record.title);
                }
            }
        }
        Ok(downloaded)
    }

    /// Genre id to name mapping, fetched once per call.
    async fn genre_names(&self) -> Result<HashMap<u64, String>> {
        let url = format!("{}/genre/movie/list", self.base_url);
        let response: GenreListResponse = self.get_json(&url, &[]).await?;
        Ok(response
            .genres
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect())
    }

    /// Top-billed cast names for a movie.
    async fn top_cast(&self, movie_id: u64) -> Result<Vec<String>> {
        let url = format!("{}/movie/{movie_id}/credits", self.base_url);
        let response: CreditsResponse = self.get_json(&url, &[]).await?;
        Ok(response
            .cast
            .into_iter()
            .take(TOP_CAST)
            .map(|member| member.name)
            .collect())
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut query: Vec<(&str, String)> = vec![("api_key", self.api_key.clone())];
        query.extend(params.iter().cloned());

        let mut last_error: Option<KinemaError> = None;
        for attempt in 1..=MAX_ATTEMPTS {
            let result = self.client.get(url).query(&query).send().await;
            match result {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.json::<T>().await?);
                }
                Ok(response) => {
                    last_error = Some(KinemaError::backend(format!(
                        "catalog returned {} for {url}",
                        response.status()
                    )));
                }
                Err(e) => last_error = Some(e.into()),
            }
            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(BACKOFF * attempt).await;
            }
        }
        Err(last_error
            .unwrap_or_else(|| KinemaError::backend(format!("catalog request to {url} failed"))))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(KinemaError::backend(format!(
                "poster fetch returned {} for {url}",
                response.status()
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn assemble_record(
    movie: DiscoverMovie,
    genre_names: &HashMap<u64, String>,
    cast: Vec<String>,
    image_base_url: &str,
) -> MovieRecord {
    let genres = movie
        .genre_ids
        .iter()
        .filter_map(|id| genre_names.get(id).cloned())
        .collect();
    let poster = movie
        .poster_path
        .map(|path| format!("{image_base_url}{path}"));
    MovieRecord::new(movie.title, movie.overview, genres, cast, poster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_response_parsing() {
        let json = r#"{
            "results": [
                {
                    "id": 27205,
                    "title": "Inception",
                    "overview": "A thief enters dreams.",
                    "genre_ids": [878, 28],
                    "poster_path": "/inception.jpg"
                },
                {
                    "id": 1,
                    "title": "Posterless",
                    "overview": "No art.",
                    "genre_ids": [],
                    "poster_path": null
                }
            ]
        }"#;
        let parsed: DiscoverResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].title, "Inception");
        assert!(parsed.results[1].poster_path.is_none());
    }

    #[test]
    fn test_assemble_record_resolves_genres_and_poster_url() {
        let movie = DiscoverMovie {
            id: 27205,
            title: "Inception".to_string(),
            overview: "A thief enters dreams.".to_string(),
            genre_ids: vec![878, 28, 999],
            poster_path: Some("/inception.jpg".to_string()),
        };
        let mut genre_names = HashMap::new();
        genre_names.insert(878, "Science Fiction".to_string());
        genre_names.insert(28, "Action".to_string());

        let record = assemble_record(
            movie,
            &genre_names,
            vec!["Leonardo DiCaprio".to_string()],
            "https://image.example/w500",
        );
        // Unknown genre ids are dropped, known ones keep catalog order.
        assert_eq!(record.genres, vec!["Science Fiction", "Action"]);
        assert_eq!(
            record.poster_path.as_deref(),
            Some("https://image.example/w500/inception.jpg")
        );
        assert_eq!(record.cast, vec!["Leonardo DiCaprio"]);
    }

    #[test]
    fn test_credits_parsing_takes_top_cast_order() {
        let json = r#"{"cast": [{"name": "A"}, {"name": "B"}]}"#;
        let parsed: CreditsResponse = serde_json::from_str(json).unwrap();
        let names: Vec<String> = parsed.cast.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
