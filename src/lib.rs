// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns

pub mod config;
pub mod database;
pub mod error;
pub mod exporter;
pub mod llm;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::{AnswerConfig, Config, LlmConfig, RetrievalConfig};
pub use database::{Embedder, EmbeddingClient, QdrantEndpoint, QdrantSearchClient, VectorSearch};
pub use error::{FillerError, Result};
pub use exporter::CsvExporter;
pub use llm::{Generator, OllamaClient, ResponsePostProcessor};
pub use models::{AnswerMap, ConversationContext, Generation, Question, SearchHit};
pub use parser::QuestionReader;
pub use pipeline::{AnswerPipeline, PipelineOptions, RunOutcome, RunStats};
pub use utils::{LogFormat, OperationTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _options = PipelineOptions::from_config(&config);
        let _processor = ResponsePostProcessor::new();
    }
}
