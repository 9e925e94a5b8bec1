use std::path::Path;

use anyhow::{Context, Result, anyhow};
use whisper_rs::{
    WhisperContext, WhisperContextParameters, WhisperVadContext, WhisperVadContextParams,
};

use crate::opts::{Device, LoadOpts};

use super::logging::init_whisper_logging;

/// Load a whisper.cpp ASR model for the configured execution target.
pub(super) fn load_context(model_path: &Path, opts: &LoadOpts) -> Result<WhisperContext> {
    init_whisper_logging();

    let path = path_str(model_path)?;
    let mut ctx_params = WhisperContextParameters::default();
    match opts.device {
        Device::Cpu => {
            ctx_params.use_gpu(false);
        }
    }

    WhisperContext::new_with_params(path, ctx_params)
        .with_context(|| format!("failed to load model from '{path}'"))
}

/// Load the Whisper VAD model, pinned to the same execution target.
pub(super) fn load_vad_context(vad_model_path: &Path, opts: &LoadOpts) -> Result<WhisperVadContext> {
    init_whisper_logging();

    let path = path_str(vad_model_path)?;

    let mut vad_params = WhisperVadContextParams::default();
    vad_params.set_n_threads(opts.n_threads as i32);
    match opts.device {
        Device::Cpu => {
            vad_params.set_use_gpu(false);
        }
    }

    WhisperVadContext::new(path, vad_params)
        .with_context(|| format!("failed to load VAD model from '{path}'"))
}

/// whisper.cpp takes paths as UTF-8 strings.
fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("model path is not valid UTF-8: '{}'", path.display()))
}
