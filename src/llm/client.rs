// file: src/llm/client.rs
// description: Ollama-style /api/generate client with context threading
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion

use crate::error::{FillerError, Result};
use crate::llm::Generator;
use crate::models::{ConversationContext, Generation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    context: &'a [i64],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    done: bool,
    #[serde(default)]
    context: Vec<i64>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    url: String,
    model: String,
}

impl OllamaClient {
    /// `url` is the full generate endpoint, e.g. `http://localhost:11434/api/generate`.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            model: model.into(),
        }
    }

    fn into_generation(response: GenerateResponse) -> Result<Generation> {
        if !response.done {
            return Err(FillerError::Llm(format!(
                "LLM response generation not done: {}",
                response.response
            )));
        }

        Ok(Generation {
            response: response.response,
            context: ConversationContext::from_tokens(response.context),
        })
    }
}

impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str, context: &ConversationContext) -> Result<Generation> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            context: context.tokens(),
        };

        debug!(
            "Sending {} chars to {} with {} context tokens",
            prompt.len(),
            self.model,
            context.len()
        );

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| FillerError::Llm(format!("Failed to send request to LLM: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FillerError::Llm(format!(
                "LLM responded with status {}: {}",
                status, error_text
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| FillerError::Llm(format!("Failed to decode LLM response: {}", e)))?;

        Self::into_generation(generate_response)
    }
}
