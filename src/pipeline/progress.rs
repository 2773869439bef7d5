// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for an answering run
// reference: uses indicatif for progress bars and tracks per-question outcomes

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Instant;

const FINISHED_MESSAGE: &str = "Questions processed";
const ABORTED_MESSAGE: &str = "Run aborted";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub questions_total: usize,
    pub answered: usize,
    pub fallback: usize,
    pub skipped: usize,
    pub duration_secs: f64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Questions that ended up with a row in the output.
    pub fn recorded(&self) -> usize {
        self.answered + self.fallback
    }

    pub fn questions_per_second(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        (self.answered + self.fallback + self.skipped) as f64 / self.duration_secs
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.answered + self.fallback + self.skipped;
        if total == 0 {
            return 0.0;
        }
        (self.recorded() as f64 / total as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    stats: RunStats,
    start_time: Instant,
    finished: bool,
}

impl ProgressTracker {
    pub fn with_color(total_questions: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        let main_bar = create_progress_bar(&multi_progress, total_questions as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self::from_bars(main_bar, detail_bar, total_questions)
    }

    /// Tracks statistics without drawing anything.
    pub fn hidden(total_questions: usize) -> Self {
        Self::from_bars(ProgressBar::hidden(), ProgressBar::hidden(), total_questions)
    }

    fn from_bars(main_bar: ProgressBar, detail_bar: ProgressBar, total_questions: usize) -> Self {
        Self {
            main_bar,
            detail_bar,
            stats: RunStats {
                questions_total: total_questions,
                ..RunStats::default()
            },
            start_time: Instant::now(),
            finished: false,
        }
    }

    pub fn inc_answered(&mut self) {
        self.stats.answered += 1;
        self.advance();
    }

    pub fn inc_fallback(&mut self) {
        self.stats.fallback += 1;
        self.advance();
    }

    pub fn inc_skipped(&mut self) {
        self.stats.skipped += 1;
        self.advance();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn finish(&mut self) {
        self.main_bar.finish_with_message(FINISHED_MESSAGE);
        self.detail_bar.finish_and_clear();
        self.finished = true;
    }

    pub fn get_stats(&self) -> RunStats {
        RunStats {
            duration_secs: self.start_time.elapsed().as_secs_f64(),
            ..self.stats.clone()
        }
    }

    fn advance(&self) {
        self.main_bar.inc(1);
        self.detail_bar.set_message(format!(
            "Answered: {} | Fallback: {} | Skipped: {}",
            self.stats.answered, self.stats.fallback, self.stats.skipped
        ));
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        if !self.finished {
            self.main_bar.abandon_with_message(ABORTED_MESSAGE);
            self.detail_bar.abandon();
        }
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}
