use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use transcribe_worker::model::DEFAULT_MODEL_ID;
use transcribe_worker::opts::DEFAULT_MODELS_DIR;
use transcribe_worker::{LoadOpts, LogFormat, ModelId, WhisperEngine, Worker, init_logging};

#[derive(Parser, Debug)]
#[command(name = "transcribe-worker")]
#[command(
    about = "Resident Whisper worker: one audio path per stdin line, one JSON result per stdout line"
)]
struct Params {
    /// Model identifier (e.g. `tiny`, `base`, `large-v3-turbo`) or a path to a ggml model file.
    #[arg(default_value = DEFAULT_MODEL_ID)]
    model: String,

    /// Directory holding `ggml-<model>.bin` files.
    #[arg(
        long = "models-dir",
        env = "TRANSCRIBE_WORKER_MODELS_DIR",
        default_value = DEFAULT_MODELS_DIR
    )]
    models_dir: PathBuf,

    /// Path to a Whisper-VAD model file (defaults to `ggml-silero-v6.2.0.bin` in the models dir).
    #[arg(long = "vad-model", env = "TRANSCRIBE_WORKER_VAD_MODEL")]
    vad_model_path: Option<PathBuf>,

    /// Format of diagnostic lines written to stderr.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() {
    let params = Params::parse();
    init_logging(params.log_format);

    if let Err(err) = run(params) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(params: Params) -> Result<()> {
    let model = ModelId::new(params.model)?;
    let opts = LoadOpts {
        models_dir: params.models_dir,
        vad_model_path: params.vad_model_path,
        ..LoadOpts::default()
    };

    // stdout carries only READY and response lines; diagnostics go to stderr.
    let worker = Worker::start(
        || WhisperEngine::load(&model, &opts),
        io::stdin().lock(),
        io::stdout().lock(),
    )
    .with_context(|| format!("failed to initialize model '{model}'"))?;

    let summary = worker.run().context("request loop failed")?;
    info!(
        shutdown = ?summary.shutdown,
        served = summary.served,
        "worker exiting"
    );
    Ok(())
}
