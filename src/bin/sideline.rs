//! `sideline` CLI — run the analysis pipeline on a local video.
//!
//! Copies the input into a directory-backed blob store, runs the full
//! pipeline against the Gemini backend (`GEMINI_API_KEY` must be set), and
//! prints where the annotated video and advice still landed.

use std::path::PathBuf;

use clap::Parser;
use sideline::{
    DirectoryStore, FfmpegLogLevel, GeminiAnalyzer, Pipeline, PipelineOptions, SidelineError,
    set_ffmpeg_log_level, storage::BlobStore,
};

const CLI_AFTER_HELP: &str = "Examples:\n  \
    sideline match.mp4\n  \
    sideline match.mp4 --store ./blobs --sample-rate 10 --container mp4\n  \
    RUST_LOG=debug sideline match.mp4 --analysis-cap 4";

#[derive(Debug, Parser)]
#[command(
    name = "sideline",
    version,
    about = "Annotate sports footage with AI-detected bounding boxes and coaching advice",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Blob store root directory (outputs land under processed/).
    #[arg(long, default_value = "./sideline-store")]
    store: PathBuf,

    /// Analyze every Nth frame.
    #[arg(long, default_value_t = 5)]
    sample_rate: usize,

    /// Maximum sampled frames analyzed per run.
    #[arg(long, default_value_t = sideline::DEFAULT_ANALYSIS_CAP)]
    analysis_cap: usize,

    /// Output container extension (webm or mp4).
    #[arg(long, default_value = "webm")]
    container: String,

    /// Gemini model to use.
    #[arg(long)]
    model: Option<String>,

    /// Show FFmpeg's native warnings instead of silencing them.
    #[arg(long)]
    ffmpeg_warnings: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(error) = run(Cli::parse()).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), SidelineError> {
    set_ffmpeg_log_level(if cli.ffmpeg_warnings {
        FfmpegLogLevel::Warning
    } else {
        FfmpegLogLevel::Error
    });

    let mut analyzer = GeminiAnalyzer::from_env()?;
    if let Some(model) = cli.model {
        analyzer = analyzer.with_model(model);
    }

    let store = DirectoryStore::new(&cli.store)?;

    // Stage the input in the store, mirroring how an upload handler would.
    let file_name = cli
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("input.mp4");
    let source = format!("uploads/{file_name}");
    store.put(&source, &cli.input).await?;

    let options = PipelineOptions::default()
        .sample_rate(cli.sample_rate)
        .analysis_cap(cli.analysis_cap)
        .container(cli.container);

    let report = Pipeline::new(analyzer, store)
        .with_options(options)
        .process(&source)
        .await?;

    println!("annotated video: {}", cli.store.join(&report.processed_video).display());
    match report.summary {
        Some(summary) => println!("\nsummary:\n{summary}"),
        None => println!("\nsummary: (strategic analysis unavailable)"),
    }
    if let Some(advice_image) = report.advice_image {
        println!("\nadvice still: {}", cli.store.join(advice_image).display());
    }

    Ok(())
}
