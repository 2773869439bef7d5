// file: src/llm/mod.rs
// description: text generation client, seam and response cleanup
// reference: internal module structure

pub mod client;
pub mod postprocess;

pub use client::OllamaClient;
pub use postprocess::ResponsePostProcessor;

use crate::error::Result;
use crate::models::{ConversationContext, Generation};

/// Stateful text generation. The caller owns the conversation context and
/// passes the value returned by one call into the next.
#[allow(async_fn_in_trait)]
pub trait Generator {
    async fn generate(&self, prompt: &str, context: &ConversationContext) -> Result<Generation>;

    /// Sends the standing instruction with no prior context. The model's
    /// acknowledgment is discarded; only the resulting context is kept.
    async fn initialize(&self, instruction: &str) -> Result<ConversationContext> {
        let generation = self
            .generate(instruction, &ConversationContext::empty())
            .await?;
        Ok(generation.context)
    }
}
