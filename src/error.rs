use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// The worker's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The worker's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so embedders aren't forced to
/// adopt `anyhow` in their own public APIs. Engine internals use `anyhow` and are
/// flattened into `Message` (with the full context chain) at the `Engine` boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error("invalid model identifier '{0}'")]
    InvalidModelId(String),

    #[error("model '{model}' not found (looked for {})", display_paths(.searched))]
    ModelNotFound { model: String, searched: Vec<PathBuf> },

    #[error("VAD model not found at '{}'", .0.display())]
    VadModelNotFound(PathBuf),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    /// Build an error from a plain description.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
