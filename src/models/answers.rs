// file: src/models/answers.rs
// description: question to answer aggregation for a single run
// reference: internal data structures

use crate::models::Question;
use std::collections::HashMap;

/// Answers keyed by question. Rows keep first-seen order; answering a
/// question again replaces its answer in place.
#[derive(Debug, Clone, Default)]
pub struct AnswerMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous answer when the question was already present.
    pub fn insert(&mut self, question: &Question, answer: impl Into<String>) -> Option<String> {
        let answer = answer.into();
        match self.index.get(question.as_str()).copied() {
            Some(position) => Some(std::mem::replace(&mut self.entries[position].1, answer)),
            None => {
                self.index
                    .insert(question.as_str().to_string(), self.entries.len());
                self.entries.push((question.as_str().to_string(), answer));
                None
            }
        }
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.index
            .get(question)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(question, answer)| (question.as_str(), answer.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> Question {
        Question::parse(text).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let mut answers = AnswerMap::new();
        assert!(answers.insert(&q("Q1"), "A1").is_none());
        assert!(answers.insert(&q("Q2"), "A2").is_none());

        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("Q1"), Some("A1"));
        assert_eq!(answers.get("Q3"), None);
    }

    #[test]
    fn test_repeated_question_overwrites() {
        let mut answers = AnswerMap::new();
        answers.insert(&q("Q1"), "first");
        answers.insert(&q("Q2"), "other");
        let previous = answers.insert(&q("Q1"), "second");

        assert_eq!(previous.as_deref(), Some("first"));
        assert_eq!(answers.len(), 2);
        let rows: Vec<_> = answers.iter().collect();
        assert_eq!(rows, vec![("Q1", "second"), ("Q2", "other")]);
    }
}
