// file: src/pipeline/prompt.rs
// description: renders ranked search hits and the question into one prompt
// reference: retrieval-augmented prompt layout

use crate::models::{Question, SearchHit};

/// Result of assembling a prompt for one question.
#[derive(Debug, Clone, PartialEq)]
pub enum AssembledPrompt {
    /// Nothing to ground an answer on; the LLM must not be called.
    NoContext,
    Prompt(String),
}

pub struct PromptAssembler;

impl PromptAssembler {
    pub fn assemble(hits: &[SearchHit], question: &Question) -> AssembledPrompt {
        if hits.is_empty() {
            return AssembledPrompt::NoContext;
        }

        let context = hits
            .iter()
            .enumerate()
            .map(|(index, hit)| Self::render_hit(index + 1, hit))
            .collect::<Vec<_>>()
            .join("\n\n");

        AssembledPrompt::Prompt(format!("{}\n\n{}", context, question))
    }

    fn render_hit(rank: usize, hit: &SearchHit) -> String {
        format!(
            "Response {}: {} (score: {:.2}) (source: {})",
            rank,
            hit.text,
            hit.score,
            hit.source_label()
        )
    }
}
