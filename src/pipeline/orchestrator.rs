// file: src/pipeline/orchestrator.rs
// description: coordinates embedding, retrieval, generation and aggregation per question
// reference: sequential retrieval-augmented answering workflow

use crate::config::Config;
use crate::database::{Embedder, VectorSearch};
use crate::error::Result;
use crate::exporter::CsvExporter;
use crate::llm::{Generator, ResponsePostProcessor};
use crate::models::{AnswerMap, ConversationContext, Question, SearchHit};
use crate::pipeline::progress::{ProgressTracker, RunStats};
use crate::pipeline::prompt::{AssembledPrompt, PromptAssembler};
use crate::utils::{OperationTimer, Validator};
use std::path::Path;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub system_prompt: String,
    pub fallback_answer: String,
    pub score_threshold: Option<f32>,
    pub show_progress: bool,
    pub colored: bool,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_prompt: config.llm.system_prompt.clone(),
            fallback_answer: config.answers.fallback_answer.clone(),
            score_threshold: config.retrieval.score_threshold,
            show_progress: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub answers: AnswerMap,
    pub stats: RunStats,
}

pub struct AnswerPipeline<E, S, G> {
    embedder: E,
    search: S,
    generator: G,
    postprocessor: ResponsePostProcessor,
    options: PipelineOptions,
}

impl<E, S, G> AnswerPipeline<E, S, G>
where
    E: Embedder,
    S: VectorSearch,
    G: Generator,
{
    pub fn new(
        embedder: E,
        search: S,
        generator: G,
        postprocessor: ResponsePostProcessor,
        options: PipelineOptions,
    ) -> Self {
        Self {
            embedder,
            search,
            generator,
            postprocessor,
            options,
        }
    }

    /// Answers every question in order. Embedding and search failures skip
    /// the question; any generation failure aborts the run and discards the
    /// answers gathered so far.
    pub async fn run(&self, questions: &[Question]) -> Result<RunOutcome> {
        let timer = OperationTimer::new("answer questions");

        info!("Sending context to LLM");
        debug!("System instruction: {}", self.options.system_prompt);
        let mut context = self.generator.initialize(&self.options.system_prompt).await?;
        info!("LLM context initialized ({} tokens)", context.len());

        let mut progress = if self.options.show_progress {
            ProgressTracker::with_color(questions.len(), self.options.colored)
        } else {
            ProgressTracker::hidden(questions.len())
        };
        let mut answers = AnswerMap::new();

        info!("Searching for answers to {} questions...", questions.len());

        for (index, question) in questions.iter().enumerate() {
            progress.set_message(Validator::truncate_text(question.as_str(), 48));

            let span = info_span!("question", n = index + 1);
            context = self
                .process_question(question, context, &mut answers, &mut progress)
                .instrument(span)
                .await?;
        }

        let stats = progress.get_stats();
        progress.finish();
        timer.finish_questions(stats.recorded() + stats.skipped);
        log_final_stats(&stats);

        Ok(RunOutcome { answers, stats })
    }

    /// Runs the pipeline and writes the CSV only once every question has
    /// been processed.
    pub async fn run_to_csv(&self, questions: &[Question], output: &Path) -> Result<RunStats> {
        let outcome = self.run(questions).await?;

        info!("Saving answers to output file: {} ...", output.display());
        CsvExporter::write(output, &outcome.answers)?;
        info!("Answers saved to {}", output.display());

        Ok(outcome.stats)
    }

    async fn process_question(
        &self,
        question: &Question,
        context: ConversationContext,
        answers: &mut AnswerMap,
        progress: &mut ProgressTracker,
    ) -> Result<ConversationContext> {
        let hits = match self.retrieve(question).await {
            Ok(hits) => hits,
            Err(e) if e.is_per_question() => {
                warn!("Skipping question \"{}\": {}", question, e);
                progress.inc_skipped();
                return Ok(context);
            }
            Err(e) => return Err(e),
        };

        match PromptAssembler::assemble(&hits, question) {
            AssembledPrompt::NoContext => {
                info!("No relevant context found, recording fallback answer");
                answers.insert(question, self.options.fallback_answer.clone());
                progress.inc_fallback();
                Ok(context)
            }
            AssembledPrompt::Prompt(prompt) => {
                debug!("Sending prompt to LLM: {}", prompt);
                let generation = self.generator.generate(&prompt, &context).await?;
                info!("LLM response received for question: {}", question);

                let answer = self.postprocessor.clean(&generation.response);
                answers.insert(question, answer);
                progress.inc_answered();
                Ok(generation.context)
            }
        }
    }

    async fn retrieve(&self, question: &Question) -> Result<Vec<SearchHit>> {
        debug!("Embedding question: {}", question);
        let vector = self.embedder.embed(question.as_str()).await?;

        debug!("Searching vector store with {} dimensions", vector.len());
        let hits = self
            .search
            .search(&vector, self.options.score_threshold)
            .await?;
        info!("Vector search returned {} hits", hits.len());

        Ok(hits)
    }
}

fn log_final_stats(stats: &RunStats) {
    info!("=== Answering Summary ===");
    info!("Duration: {:.2} seconds", stats.duration_secs);
    info!("Questions: {}", stats.questions_total);
    info!("Answered by LLM: {}", stats.answered);
    info!("Fallback answers: {}", stats.fallback);
    info!("Skipped: {}", stats.skipped);
    info!("Throughput: {:.2} questions/sec", stats.questions_per_second());
    info!("Success rate: {:.2}%", stats.success_rate());
    info!("=========================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FillerError;
    use crate::models::Generation;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use tempfile::TempDir;

    const FALLBACK: &str = "No information available";

    /// Embeds a question as `[position in the known list]`.
    struct FakeEmbedder {
        known: Vec<&'static str>,
        failing: Vec<&'static str>,
    }

    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if self.failing.contains(&text) {
                return Err(FillerError::Embedding("embedding service down".to_string()));
            }
            let position = self.known.iter().position(|k| *k == text).unwrap_or(99);
            Ok(vec![position as f32])
        }
    }

    /// Returns canned hits per embedded position, applying the threshold.
    struct FakeSearch {
        hits: HashMap<usize, Vec<SearchHit>>,
        failing: Vec<usize>,
    }

    impl VectorSearch for FakeSearch {
        async fn search(&self, vector: &[f32], threshold: Option<f32>) -> Result<Vec<SearchHit>> {
            let position = vector[0] as usize;
            if self.failing.contains(&position) {
                return Err(FillerError::Search("qdrant unavailable".to_string()));
            }
            Ok(self
                .hits
                .get(&position)
                .map(|hits| hits.iter().filter(|h| h.meets(threshold)).cloned().collect())
                .unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct Calls {
        prompts: Vec<String>,
        contexts: Vec<Vec<i64>>,
    }

    /// Answers with `<think>..</think>Answer N` and grows the context by one
    /// token per call. Fails on the call numbered `fail_on` (0 is init).
    struct FakeGenerator {
        calls: Rc<RefCell<Calls>>,
        fail_on: Option<usize>,
    }

    impl Generator for FakeGenerator {
        async fn generate(&self, prompt: &str, context: &ConversationContext) -> Result<Generation> {
            let mut calls = self.calls.borrow_mut();
            let call = calls.prompts.len();
            calls.prompts.push(prompt.to_string());
            calls.contexts.push(context.tokens().to_vec());

            if self.fail_on == Some(call) {
                return Err(FillerError::Llm("LLM responded with status 500".to_string()));
            }

            let mut tokens = context.tokens().to_vec();
            tokens.push(call as i64);
            Ok(Generation {
                response: format!("<think>reasoning {call}</think>\n Answer {call} "),
                context: ConversationContext::from_tokens(tokens),
            })
        }
    }

    fn options() -> PipelineOptions {
        PipelineOptions {
            system_prompt: "You are a compliance assistant.".to_string(),
            fallback_answer: FALLBACK.to_string(),
            score_threshold: Some(0.4),
            show_progress: false,
            colored: false,
        }
    }

    fn questions(texts: &[&str]) -> Vec<Question> {
        texts.iter().filter_map(|t| Question::parse(t)).collect()
    }

    fn pipeline(
        known: Vec<&'static str>,
        hits: HashMap<usize, Vec<SearchHit>>,
        fail_on: Option<usize>,
    ) -> (
        AnswerPipeline<FakeEmbedder, FakeSearch, FakeGenerator>,
        Rc<RefCell<Calls>>,
    ) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let pipeline = AnswerPipeline::new(
            FakeEmbedder {
                known,
                failing: vec![],
            },
            FakeSearch {
                hits,
                failing: vec![],
            },
            FakeGenerator {
                calls: Rc::clone(&calls),
                fail_on,
            },
            ResponsePostProcessor::new(),
            options(),
        );
        (pipeline, calls)
    }

    fn backup_hits() -> Vec<SearchHit> {
        vec![SearchHit::new(
            "Backups run nightly",
            Some("ops.md".to_string()),
            0.9,
        )]
    }

    #[tokio::test]
    async fn test_answers_and_fallback_rows() {
        let known = vec!["How are backups handled?", "Do you have a DPO?"];
        let hits = HashMap::from([(0, backup_hits())]);
        let (pipeline, calls) = pipeline(known.clone(), hits, None);

        let outcome = pipeline.run(&questions(&known)).await.unwrap();

        assert_eq!(outcome.answers.len(), 2);
        assert_eq!(outcome.answers.get("How are backups handled?"), Some("Answer 1"));
        assert_eq!(outcome.answers.get("Do you have a DPO?"), Some(FALLBACK));
        assert_eq!(outcome.stats.answered, 1);
        assert_eq!(outcome.stats.fallback, 1);

        // init call + one turn; the fallback question never reaches the LLM
        let calls = calls.borrow();
        assert_eq!(calls.prompts.len(), 2);
        assert_eq!(calls.prompts[0], "You are a compliance assistant.");
        assert_eq!(
            calls.prompts[1],
            "Response 1: Backups run nightly (score: 0.90) (source: ops.md)\n\nHow are backups handled?"
        );
    }

    #[tokio::test]
    async fn test_below_threshold_hits_use_fallback() {
        let known = vec!["Is MFA enforced?"];
        let weak = vec![SearchHit::new("Loosely related", None, 0.2)];
        let (pipeline, calls) = pipeline(known.clone(), HashMap::from([(0, weak)]), None);

        let outcome = pipeline.run(&questions(&known)).await.unwrap();

        assert_eq!(outcome.answers.get("Is MFA enforced?"), Some(FALLBACK));
        assert_eq!(calls.borrow().prompts.len(), 1);
    }

    #[tokio::test]
    async fn test_context_threaded_between_turns() {
        let known = vec!["Q one?", "Q two?", "Q three?"];
        let hits = HashMap::from([(0, backup_hits()), (1, backup_hits()), (2, backup_hits())]);
        let (pipeline, calls) = pipeline(known.clone(), hits, None);

        pipeline.run(&questions(&known)).await.unwrap();

        let calls = calls.borrow();
        assert_eq!(
            calls.contexts,
            vec![vec![], vec![0], vec![0, 1], vec![0, 1, 2]]
        );
    }

    #[tokio::test]
    async fn test_retrieval_failures_skip_question() {
        let known = vec!["Embed fails?", "Search fails?", "Works?"];
        let calls = Rc::new(RefCell::new(Calls::default()));
        let pipeline = AnswerPipeline::new(
            FakeEmbedder {
                known: known.clone(),
                failing: vec!["Embed fails?"],
            },
            FakeSearch {
                hits: HashMap::from([(2, backup_hits())]),
                failing: vec![1],
            },
            FakeGenerator {
                calls: Rc::clone(&calls),
                fail_on: None,
            },
            ResponsePostProcessor::new(),
            options(),
        );

        let outcome = pipeline.run(&questions(&known)).await.unwrap();

        assert_eq!(outcome.answers.len(), 1);
        assert_eq!(outcome.answers.get("Works?"), Some("Answer 1"));
        assert_eq!(outcome.stats.skipped, 2);
    }

    #[tokio::test]
    async fn test_init_failure_aborts() {
        let known = vec!["Q?"];
        let (pipeline, _) = pipeline(known.clone(), HashMap::new(), Some(0));

        let err = pipeline.run(&questions(&known)).await.unwrap_err();
        assert!(matches!(err, FillerError::Llm(_)));
    }

    #[tokio::test]
    async fn test_turn_failure_aborts_without_writing() {
        let known = vec!["First?", "Second?", "Third?"];
        let hits = HashMap::from([(0, backup_hits()), (1, backup_hits()), (2, backup_hits())]);
        let (pipeline, calls) = pipeline(known.clone(), hits, Some(2));

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("answers.csv");

        let err = pipeline
            .run_to_csv(&questions(&known), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, FillerError::Llm(_)));
        assert!(!output.exists());
        // third question never attempted
        assert_eq!(calls.borrow().prompts.len(), 3);
    }

    #[tokio::test]
    async fn test_run_to_csv_writes_all_rows() {
        let known = vec!["Backups, \"daily\"?", "Do you have a DPO?"];
        let hits = HashMap::from([(0, backup_hits())]);
        let (pipeline, _) = pipeline(known.clone(), hits, None);

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("answers.csv");

        let stats = pipeline
            .run_to_csv(&questions(&known), &output)
            .await
            .unwrap();
        assert_eq!(stats.recorded(), 2);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&output)
            .unwrap();
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();

        assert_eq!(
            rows,
            vec![
                vec!["Backups, \"daily\"?".to_string(), "Answer 1".to_string()],
                vec!["Do you have a DPO?".to_string(), FALLBACK.to_string()],
            ]
        );
    }
}
