//! HTTP inference-endpoint embedders.
//!
//! These embedders call an external inference service over HTTP: a
//! sentence-encoder endpoint for text and a CLIP-style encoder endpoint for
//! images. The service is a black box; only the wire contract matters here.
//!
//! The text endpoint speaks the common embeddings-API shape
//! (`{"model": ..., "input": [...]}` in, `{"data": [{"embedding": [...]}]}`
//! out). The image endpoint accepts raw image bytes and returns
//! `{"embedding": [...]}`.
//!
//! Both embedders validate the returned dimension against the declared one;
//! a service that starts returning a different width is a configuration
//! error worth failing loudly on, since it would silently poison the
//! collection otherwise.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embedding::image_embedder::ImageEmbedder;
use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{KinemaError, Result};
use crate::vector::Vector;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request structure for the text embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    /// Model identifier to use for embeddings.
    model: String,
    /// Input texts to embed (batch).
    input: Vec<String>,
}

/// Response structure from the text embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    /// List of embedding data objects, one per input.
    data: Vec<EmbeddingData>,
}

/// Individual embedding data from the response.
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    /// The embedding vector.
    embedding: Vec<f32>,
}

/// Response structure from the image embeddings endpoint.
#[derive(Debug, Deserialize)]
struct ImageEmbeddingResponse {
    /// The embedding vector.
    embedding: Vec<f32>,
}

/// Text embedder backed by a remote embeddings API.
pub struct RemoteTextEmbedder {
    /// HTTP client for making API requests.
    client: Client,
    /// Endpoint URL of the embeddings service.
    endpoint: String,
    /// API key for authentication, sent as a bearer token.
    api_key: String,
    /// Model name requested from the service.
    model: String,
    /// Dimension of the output embeddings.
    dimension: usize,
}

impl RemoteTextEmbedder {
    /// Create a new remote text embedder.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Embeddings endpoint URL
    /// * `api_key` - Bearer token for the service
    /// * `model` - Model name to request
    /// * `dimension` - Expected embedding dimension
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimension: usize,
    ) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            dimension,
        })
    }

    async fn request(&self, inputs: Vec<String>) -> Result<Vec<Vector>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: inputs,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KinemaError::embedding(format!(
                "text embedding endpoint returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        parsed
            .data
            .into_iter()
            .map(|data| {
                let vector = Vector::new(data.embedding);
                vector.validate_dimension(self.dimension)?;
                Ok(vector)
            })
            .collect()
    }
}

#[async_trait]
impl TextEmbedder for RemoteTextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.request(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| KinemaError::embedding("text embedding endpoint returned no data"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .request(texts.iter().map(|t| t.to_string()).collect())
            .await?;
        if vectors.len() != texts.len() {
            return Err(KinemaError::embedding(format!(
                "text embedding endpoint returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Image embedder backed by a remote encoder endpoint.
///
/// Sends the raw image bytes in the request body; the service performs the
/// decode, so an undecodable file surfaces as an endpoint error.
pub struct RemoteImageEmbedder {
    /// HTTP client for making API requests.
    client: Client,
    /// Endpoint URL of the image encoder service.
    endpoint: String,
    /// API key for authentication, sent as a bearer token.
    api_key: String,
    /// Dimension of the output embeddings.
    dimension: usize,
}

impl RemoteImageEmbedder {
    /// Create a new remote image embedder.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        dimension: usize,
    ) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            dimension,
        })
    }
}

#[async_trait]
impl ImageEmbedder for RemoteImageEmbedder {
    async fn embed(&self, image_path: &str) -> Result<Vector> {
        let bytes = tokio::fs::read(image_path)
            .await
            .map_err(|e| KinemaError::embedding(format!("failed to read '{image_path}': {e}")))?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(KinemaError::embedding(format!(
                "image embedding endpoint returned {status} for '{image_path}': {body}"
            )));
        }

        let parsed: ImageEmbeddingResponse = response.json().await?;
        let vector = Vector::new(parsed.embedding);
        vector.validate_dimension(self.dimension)?;
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "remote-image"
    }
}
