// file: src/database/mod.rs
// description: retrieval services module exports and seams
// reference: internal module structure

pub mod client;
pub mod embeddings;

pub use client::{QdrantEndpoint, QdrantSearchClient};
pub use embeddings::EmbeddingClient;

use crate::error::Result;
use crate::models::SearchHit;

/// Turns text into a vector for similarity search.
#[allow(async_fn_in_trait)]
pub trait Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Ranked similarity search. An empty `Vec` means nothing relevant was
/// found; transport and decoding failures are errors.
#[allow(async_fn_in_trait)]
pub trait VectorSearch {
    async fn search(&self, vector: &[f32], threshold: Option<f32>) -> Result<Vec<SearchHit>>;
}
