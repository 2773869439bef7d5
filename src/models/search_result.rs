// file: src/models/search_result.rs
// description: Search hit model with relevance scores
// reference: Used for vector similarity search results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Snippet text taken from the point payload
    pub text: String,

    /// Origin of the snippet (document name, URL...), when the payload has one
    pub source: Option<String>,

    /// Relevance score (higher is more relevant)
    pub score: f32,
}

impl SearchHit {
    pub fn new(text: impl Into<String>, source: Option<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            source,
            score,
        }
    }

    /// Build a hit from a raw point payload. Returns `None` when the payload
    /// has no string value under `text_field`.
    pub fn from_payload(
        payload: &Map<String, Value>,
        text_field: &str,
        source_field: &str,
        score: f32,
    ) -> Option<Self> {
        let text = payload.get(text_field)?.as_str()?.to_string();
        let source = payload
            .get(source_field)
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            text,
            source,
            score,
        })
    }

    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or("unknown")
    }

    pub fn meets(&self, threshold: Option<f32>) -> bool {
        threshold.is_none_or(|min| self.score >= min)
    }
}
