// file: src/parser/questions.rs
// description: newline-delimited question source reader
// reference: one input line is one question for the LLM

use crate::error::{FillerError, Result};
use crate::models::Question;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

pub struct QuestionReader;

impl QuestionReader {
    /// Reads every non-blank line of `path` as a question, in file order.
    /// Duplicates are kept.
    pub fn read(path: &Path) -> Result<Vec<Question>> {
        info!("Processing source file: {}", path.display());

        let file = File::open(path).map_err(|source| FillerError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::read_from(BufReader::new(file)).map_err(|source| FillerError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read_from<R: BufRead>(reader: R) -> std::io::Result<Vec<Question>> {
        let mut questions = Vec::new();

        for line in reader.lines() {
            if let Some(question) = Question::parse(&line?) {
                questions.push(question);
            }
        }

        debug!("Parsed {} questions", questions.len());
        Ok(questions)
    }
}
