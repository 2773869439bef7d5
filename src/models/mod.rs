// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod answers;
pub mod conversation;
pub mod question;
pub mod search_result;

pub use answers::AnswerMap;
pub use conversation::{ConversationContext, Generation};
pub use question::Question;
pub use search_result::SearchHit;
