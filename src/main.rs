// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use form_filler::utils::logging::{format_error, format_success, format_warning, init_logger};
use form_filler::{
    AnswerPipeline, Config, EmbeddingClient, LogFormat, OllamaClient, PipelineOptions,
    QdrantEndpoint, QdrantSearchClient, QuestionReader, ResponsePostProcessor, Validator,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "form_filler")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Compliance form filler backed by Qdrant retrieval and an LLM", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml",
        global = true
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    color: bool,

    /// Enable verbose logging
    #[arg(short, long, action = ArgAction::SetTrue, env = "VERBOSE", global = true)]
    verbose: bool,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Json, env = "LOG_FORMAT", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer the questions in the source file and save the questions/answers to the output file
    Answer(AnswerArgs),
}

#[derive(Args)]
struct AnswerArgs {
    /// .txt file containing the questions, one per line
    #[arg(long, env = "SOURCE_FILE", value_name = "FILE")]
    source_file: PathBuf,

    /// .csv file to save the answers to questions
    #[arg(long, env = "OUTPUT_FILE", value_name = "FILE")]
    output_file: PathBuf,

    /// Qdrant URL for vector database
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// URL for the LLM generate endpoint
    #[arg(long, env = "LLM_URL")]
    llm_url: String,

    /// URL for the embedding service
    #[arg(long, env = "EMBEDDING_API_URL")]
    embedding_api_url: String,

    /// Qdrant collection to search (overrides configuration)
    #[arg(long)]
    collection: Option<String>,

    /// Minimum relevance score for retrieved snippets (overrides configuration)
    #[arg(long, value_name = "SCORE", conflicts_with = "no_score_threshold")]
    score_threshold: Option<f32>,

    /// Keep every retrieved snippet regardless of score
    #[arg(long)]
    no_score_threshold: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logger(cli.log_format, cli.verbose, cli.color);

    let run_id = Uuid::new_v4();
    let log_format = cli.log_format;

    match in_run_span(run_id, run(cli)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if log_format == LogFormat::Text {
                eprintln!("{}", format_error(&format!("{:#}", e)));
            }
            ExitCode::FAILURE
        }
    }
}

/// Runs `task` under the `run` span so a fatal error is logged with the run id.
async fn in_run_span(run_id: Uuid, task: impl Future<Output = Result<()>>) -> Result<()> {
    async {
        let result = task.await;
        if let Err(e) = &result {
            error!("Failed to run: {:#}", e);
        }
        result
    }
    .instrument(info_span!("run", %run_id))
    .await
}

async fn run(cli: Cli) -> Result<()> {
    info!("Compliance form filler");

    if !cli.config.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            cli.config.display()
        );
    } else {
        info!("Loading configuration from: {}", cli.config.display());
    }

    let config = Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?;

    match cli.command {
        Commands::Answer(args) => cmd_answer(config, args, cli.log_format, cli.color).await,
    }
}

async fn cmd_answer(
    mut config: Config,
    args: AnswerArgs,
    log_format: LogFormat,
    color: bool,
) -> Result<()> {
    Validator::validate_source_file(&args.source_file)?;
    Validator::validate_output_file(&args.output_file)?;
    Validator::validate_url(&args.llm_url, "llm-url")?;
    Validator::validate_url(&args.embedding_api_url, "embedding-api-url")?;
    let endpoint =
        QdrantEndpoint::parse(&args.qdrant_url).context("Failed to process Qdrant URL")?;

    if let Some(collection) = args.collection {
        config.retrieval.collection_name = collection;
    }
    if args.no_score_threshold {
        config.retrieval.score_threshold = None;
    } else if let Some(threshold) = args.score_threshold {
        config.retrieval.score_threshold = Some(threshold);
    }
    config.validate().context("Invalid command line overrides")?;

    let questions =
        QuestionReader::read(&args.source_file).context("Failed to read source file")?;
    info!("Questions parsed: {}", questions.len());

    let postprocessor = ResponsePostProcessor::with_markers(
        &config.llm.reasoning_open_tag,
        &config.llm.reasoning_close_tag,
    )?;

    let mut options = PipelineOptions::from_config(&config);
    // text logs share stderr with the progress bar
    options.show_progress = log_format == LogFormat::Json;
    options.colored = color;

    let search = QdrantSearchClient::new(&endpoint, config.retrieval.clone())
        .context("Failed to connect to Qdrant")?;

    let pipeline = AnswerPipeline::new(
        EmbeddingClient::new(args.embedding_api_url),
        search,
        OllamaClient::new(args.llm_url, config.llm.model.clone()),
        postprocessor,
        options,
    );

    let stats = pipeline
        .run_to_csv(&questions, &args.output_file)
        .await
        .context("Failed to answer questions")?;

    if log_format == LogFormat::Text {
        eprintln!(
            "{}",
            format_success(&format!(
                "{} answers saved to {}",
                stats.recorded(),
                args.output_file.display()
            ))
        );
        if stats.skipped > 0 {
            eprintln!(
                "{}",
                format_warning(&format!(
                    "{} questions skipped after retrieval errors",
                    stats.skipped
                ))
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fatal_error_logged_with_run_id() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_writer(move || writer.clone())
            .finish();

        let run_id = Uuid::new_v4();
        let result = tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(in_run_span(run_id, async {
                Err(anyhow::anyhow!("qdrant unreachable"))
            }))
        });
        assert!(result.is_err());

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("Failed to run"))
            .expect("fatal error is logged");
        let entry: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(entry["level"], "ERROR");
        assert_eq!(entry["span"]["name"], "run");
        assert_eq!(entry["span"]["run_id"], run_id.to_string());
    }
}
