//! Model identifiers and their resolution to files on disk.
//!
//! Identifiers follow whisper.cpp's artifact naming: `base` lives in
//! `ggml-base.bin`, `base-q8_0` in `ggml-base-q8_0.bin`, and so on.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::opts::{LoadOpts, Precision};
use crate::{Error, Result};

/// Identifier used when the caller doesn't name a model.
pub const DEFAULT_MODEL_ID: &str = "base";

/// Suffix of the quantized artifact preferred for reduced precision.
const REDUCED_PRECISION_SUFFIX: &str = "-q8_0";

/// Quantization suffixes whisper.cpp publishes.
const QUANTIZATION_SUFFIXES: &[&str] = &["-q5_0", "-q5_1", "-q8_0"];

/// Which model variant to load; fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId(String);

impl ModelId {
    /// Validate a model identifier.
    ///
    /// Anything that names an existing file is accepted as-is; otherwise the
    /// identifier must be a bare name usable inside `ggml-<name>.bin`.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidModelId(raw));
        }

        if Path::new(trimmed).is_file() {
            return Ok(Self(trimmed.to_owned()));
        }

        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !trimmed.starts_with('.');
        if !valid {
            return Err(Error::InvalidModelId(raw));
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier already names a quantized artifact.
    pub fn is_quantized(&self) -> bool {
        QUANTIZATION_SUFFIXES
            .iter()
            .any(|suffix| self.0.ends_with(suffix))
    }

    /// Candidate model files for this identifier, most preferred first.
    pub fn candidates(&self, opts: &LoadOpts) -> Vec<PathBuf> {
        let direct = Path::new(&self.0);
        if direct.is_file() {
            return vec![direct.to_path_buf()];
        }

        let mut out = Vec::with_capacity(2);
        if opts.precision == Precision::Reduced && !self.is_quantized() {
            out.push(
                opts.models_dir
                    .join(format!("ggml-{}{REDUCED_PRECISION_SUFFIX}.bin", self.0)),
            );
        }
        out.push(opts.models_dir.join(format!("ggml-{}.bin", self.0)));
        out
    }

    /// Resolve to the first candidate file that exists.
    pub fn resolve(&self, opts: &LoadOpts) -> Result<PathBuf> {
        let candidates = self.candidates(opts);
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Ok(path.clone()),
            None => Err(Error::ModelNotFound {
                model: self.0.clone(),
                searched: candidates,
            }),
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self(DEFAULT_MODEL_ID.to_owned())
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
