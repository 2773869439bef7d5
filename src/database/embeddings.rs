// file: src/database/embeddings.rs
// description: HTTP embedding service client for question vectors
// reference: POST {"texts": [...]} -> {"vectors": [[...]]}

use crate::database::Embedder;
use crate::error::{FillerError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    vectors: Vec<Vec<f32>>,
}

pub struct EmbeddingClient {
    client: Client,
    url: String,
}

impl EmbeddingClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    fn first_vector(response: EmbedResponse) -> Result<Vec<f32>> {
        match response.vectors.into_iter().next() {
            Some(vector) if !vector.is_empty() => Ok(vector),
            _ => Err(FillerError::Embedding(
                "No embedding returned by the embedding service".to_string(),
            )),
        }
    }
}

impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest { texts: vec![text] };

        debug!("Requesting embedding for {} chars", text.len());

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                FillerError::Embedding(format!("Failed to reach embedding API: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FillerError::Embedding(format!(
                "Embedding API responded with status {}: {}",
                status, error_text
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            FillerError::Embedding(format!("Invalid embedding response: {}", e))
        })?;

        let vector = Self::first_vector(embed_response)?;
        debug!("Received embedding of dimension {}", vector.len());
        Ok(vector)
    }
}
