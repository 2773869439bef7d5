// file: src/database/client.rs
// description: Qdrant client wrapper for scored point search
// reference: https://docs.rs/qdrant-client

use crate::config::RetrievalConfig;
use crate::database::VectorSearch;
use crate::error::{FillerError, Result};
use crate::models::SearchHit;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{ScoredPoint, SearchPointsBuilder, Value as QdrantValue};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error, info};

/// Port used when the url carries none (Qdrant's gRPC listener).
pub const DEFAULT_QDRANT_PORT: u16 = 6334;

/// Qdrant location reduced to scheme, host and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QdrantEndpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl QdrantEndpoint {
    /// Accepts `host:port`, `http://host:port` or `https://host:port`.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) => (scheme.to_ascii_lowercase(), rest),
            None => ("http".to_string(), url),
        };

        if scheme != "http" && scheme != "https" {
            return Err(FillerError::Validation(format!(
                "Unsupported Qdrant URL scheme: {}",
                scheme
            )));
        }

        let authority = rest.split('/').next().unwrap_or_default();

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    FillerError::Validation(format!("Invalid Qdrant port '{}': {}", port, e))
                })?;
                (host, port)
            }
            None => (authority, DEFAULT_QDRANT_PORT),
        };

        if host.is_empty() {
            return Err(FillerError::Validation(format!(
                "Invalid Qdrant URL, expected 'host:port': {}",
                url
            )));
        }

        if port == 0 {
            return Err(FillerError::Validation("Port cannot be 0".to_string()));
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }

    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl fmt::Display for QdrantEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

pub struct QdrantSearchClient {
    client: Qdrant,
    retrieval: RetrievalConfig,
}

impl QdrantSearchClient {
    /// The connection is opened lazily on the first search.
    pub fn new(endpoint: &QdrantEndpoint, retrieval: RetrievalConfig) -> Result<Self> {
        info!(
            "Creating Qdrant client for {} (collection: {})",
            endpoint, retrieval.collection_name
        );

        let client = Qdrant::from_url(&endpoint.url())
            .skip_compatibility_check()
            .build()
            .map_err(|e| {
                error!("Failed to create Qdrant client: {}", e);
                FillerError::Config(format!("Failed to create Qdrant client: {}", e))
            })?;

        Ok(Self { client, retrieval })
    }

    /// Keeps points that carry a text payload and meet the threshold,
    /// preserving the service's ranking.
    fn collect_hits(&self, points: Vec<ScoredPoint>, threshold: Option<f32>) -> Vec<SearchHit> {
        let total = points.len();

        let hits: Vec<SearchHit> = points
            .into_iter()
            .filter_map(|point| {
                SearchHit::from_payload(
                    &payload_to_json(point.payload),
                    &self.retrieval.text_field,
                    &self.retrieval.source_field,
                    point.score,
                )
            })
            .filter(|hit| hit.meets(threshold))
            .collect();

        if hits.len() < total {
            debug!(
                "Dropped {} of {} points (below threshold or missing '{}')",
                total - hits.len(),
                total,
                self.retrieval.text_field
            );
        }

        hits
    }
}

impl VectorSearch for QdrantSearchClient {
    async fn search(&self, vector: &[f32], threshold: Option<f32>) -> Result<Vec<SearchHit>> {
        let mut request = SearchPointsBuilder::new(
            &self.retrieval.collection_name,
            vector.to_vec(),
            self.retrieval.limit as u64,
        )
        .with_payload(true);

        if let Some(threshold) = threshold {
            request = request.score_threshold(threshold);
        }

        let response = self
            .client
            .search_points(request)
            .await
            .map_err(|e| FillerError::Search(format!("Qdrant search failed: {}", e)))?;

        let hits = self.collect_hits(response.result, threshold);
        debug!("Qdrant search returned {} usable hits", hits.len());
        Ok(hits)
    }
}

fn payload_to_json(payload: HashMap<String, QdrantValue>) -> Map<String, Value> {
    payload
        .into_iter()
        .map(|(key, value)| (key, qdrant_value_to_json(value)))
        .collect()
}

/// Scalars only; nested structs and lists are never read from a snippet.
fn qdrant_value_to_json(value: QdrantValue) -> Value {
    match value.kind {
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => Number::from_f64(d).map_or(Value::Null, Value::Number),
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        _ => Value::Null,
    }
}
