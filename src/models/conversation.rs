// file: src/models/conversation.rs
// description: conversation context threaded between LLM calls
// reference: https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion

use serde::{Deserialize, Serialize};

/// Opaque token sequence returned by the generation service. Each call
/// consumes the previous value and yields the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationContext(Vec<i64>);

impl ConversationContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: Vec<i64>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub response: String,
    pub context: ConversationContext,
}
