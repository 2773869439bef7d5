// file: src/llm/postprocess.rs
// description: strips reasoning blocks from raw model output
// reference: https://docs.rs/regex

use crate::error::{FillerError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    pub static ref THINK_BLOCK: Regex =
        Regex::new(r"(?s)<think>(.*?)</think>").expect("THINK_BLOCK regex is valid");
}

#[derive(Debug, Clone)]
pub struct ResponsePostProcessor {
    pattern: Regex,
}

impl ResponsePostProcessor {
    pub fn new() -> Self {
        Self {
            pattern: THINK_BLOCK.clone(),
        }
    }

    /// Builds a processor for a custom marker pair. Markers are matched
    /// literally.
    pub fn with_markers(open: &str, close: &str) -> Result<Self> {
        let pattern = format!(r"(?s){}(.*?){}", regex::escape(open), regex::escape(close));
        let pattern = Regex::new(&pattern).map_err(|e| {
            FillerError::Config(format!("Invalid reasoning markers {open} / {close}: {e}"))
        })?;
        Ok(Self { pattern })
    }

    /// Removes every marked block, non-greedy and across newlines, then trims.
    pub fn clean(&self, raw: &str) -> String {
        for captures in self.pattern.captures_iter(raw) {
            if let Some(removed) = captures.get(1) {
                debug!(removed = removed.as_str().trim(), "Removed internal LLM content");
            }
        }

        let cleaned = self.pattern.replace_all(raw, "").trim().to_string();
        debug!("Post-processed response: {:?}", cleaned);
        cleaned
    }
}

impl Default for ResponsePostProcessor {
    fn default() -> Self {
        Self::new()
    }
}
