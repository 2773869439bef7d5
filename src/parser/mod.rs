// file: src/parser/mod.rs
// description: question source parsing module exports
// reference: internal module structure

pub mod questions;

pub use questions::QuestionReader;
