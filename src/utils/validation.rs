// file: src/utils/validation.rs
// description: input validation utilities for flags and file paths
// reference: input validation patterns

use crate::error::{FillerError, Result};
use std::fs::File;
use std::path::Path;

pub struct Validator;

impl Validator {
    /// The source file must exist, be readable and end in `.txt`.
    pub fn validate_source_file(path: &Path) -> Result<()> {
        Self::validate_extension(path, "txt", "source-file")?;

        if !path.is_file() {
            return Err(FillerError::Config(format!(
                "invalid source-file path: {}",
                path.display()
            )));
        }

        File::open(path).map_err(|e| {
            FillerError::Config(format!(
                "source-file {} cannot be opened: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    pub fn validate_output_file(path: &Path) -> Result<()> {
        Self::validate_extension(path, "csv", "output-file")
    }

    pub fn validate_extension(path: &Path, extension: &str, flag: &str) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == extension => Ok(()),
            _ => Err(FillerError::Config(format!(
                "{} must be a .{} file: {}",
                flag,
                extension,
                path.display()
            ))),
        }
    }

    pub fn validate_url(url: &str, flag: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(FillerError::Config(format!("{} is required", flag)));
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FillerError::Config(format!(
                "Invalid {} format: {}",
                flag, url
            )));
        }
        Ok(())
    }

    /// Shortens text to at most `max_chars` characters, appending `...`.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
            None => text.to_string(),
        }
    }
}
