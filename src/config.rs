// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{FillerError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a compliance assistant. For each of the following compliance questions, I want a single, ready-to-use answer that can be directly pasted into a form. Your response must be precise, formal, and short (no more than 7 lines). Do not repeat the question. Focus only on answering with factual and relevant information.\n\nEach question will be preceded by context entries like:\n\"Response 1: We back up data nightly to an encrypted off-site store. (score: 0.94) (source: backup-policy.pdf)\"\n\nIf the context does not answer the question, say so briefly.\n\nOnly return the answer, nothing else.\n";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub answers: AnswerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    pub collection_name: String,
    pub text_field: String,
    pub source_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub model: String,
    pub system_prompt: String,
    pub reasoning_open_tag: String,
    pub reasoning_close_tag: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnswerConfig {
    pub fallback_answer: String,
}

impl Config {
    /// Layers built-in defaults, an optional TOML file and `FORM_FILLER__*`
    /// environment variables, in that order.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| FillerError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FORM_FILLER")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| FillerError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| FillerError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            retrieval: RetrievalConfig {
                collection_name: "compliance_corpus".to_string(),
                text_field: "text".to_string(),
                source_field: "source".to_string(),
                score_threshold: Some(0.4),
                limit: 5,
            },
            llm: LlmConfig {
                model: "deepseek-r1:8b".to_string(),
                system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
                reasoning_open_tag: "<think>".to_string(),
                reasoning_close_tag: "</think>".to_string(),
            },
            answers: AnswerConfig {
                fallback_answer: "No information available".to_string(),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.limit == 0 {
            return Err(FillerError::Config(
                "retrieval.limit must be greater than 0".to_string(),
            ));
        }

        if let Some(threshold) = self.retrieval.score_threshold
            && !(0.0..=1.0).contains(&threshold)
        {
            return Err(FillerError::Config(format!(
                "retrieval.score_threshold must be within [0, 1], got {}",
                threshold
            )));
        }

        if self.retrieval.collection_name.trim().is_empty() {
            return Err(FillerError::Config(
                "retrieval.collection_name cannot be empty".to_string(),
            ));
        }

        if self.retrieval.text_field.trim().is_empty() {
            return Err(FillerError::Config(
                "retrieval.text_field cannot be empty".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(FillerError::Config("llm.model cannot be empty".to_string()));
        }

        if self.llm.reasoning_open_tag.is_empty() || self.llm.reasoning_close_tag.is_empty() {
            return Err(FillerError::Config(
                "llm reasoning tags cannot be empty".to_string(),
            ));
        }

        if self.answers.fallback_answer.trim().is_empty() {
            return Err(FillerError::Config(
                "answers.fallback_answer cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
