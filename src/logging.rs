use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the `EnvFilter` directive for diagnostics.
pub const LOG_ENV_VAR: &str = "TRANSCRIBE_WORKER_LOG";

/// How diagnostic lines are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    /// One human-readable line per event.
    #[default]
    Text,

    /// Structured JSON, one object per event.
    Json,
}

/// Initialize diagnostic logging on stderr.
///
/// stdout belongs to the result protocol, so nothing here may ever write to it.
/// Defaults to `info` (startup progress stays visible) unless overridden by
/// `TRANSCRIBE_WORKER_LOG`. Safe to call more than once.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);

    let _ = match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
    };
}
