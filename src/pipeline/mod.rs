// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod progress;
mod prompt;

pub use orchestrator::{AnswerPipeline, PipelineOptions, RunOutcome};
pub use progress::{ProgressTracker, RunStats};
pub use prompt::{AssembledPrompt, PromptAssembler};
