// file: src/utils/telemetry.rs
// description: wall-clock timing for a batch of questions

use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Times one batch of questions and reports per-question latency.
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        debug!("Timing started: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Logs total and mean time per question; returns the mean.
    pub fn finish_questions(self, questions: usize) -> Duration {
        let elapsed = self.elapsed();
        let per_question = mean_per_question(elapsed, questions);
        info!(
            operation = %self.operation,
            questions,
            "Finished {} questions in {:.2}s ({:.2}s per question)",
            questions,
            elapsed.as_secs_f64(),
            per_question.as_secs_f64()
        );
        per_question
    }
}

fn mean_per_question(elapsed: Duration, questions: usize) -> Duration {
    if questions == 0 {
        return Duration::ZERO;
    }
    elapsed.div_f64(questions as f64)
}
