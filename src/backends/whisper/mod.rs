use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info};
use whisper_rs::{WhisperContext, WhisperVadContext};

use crate::audio::{TARGET_SAMPLE_RATE, decode_file};
use crate::engine::{Engine, Transcript};
use crate::model::ModelId;
use crate::opts::{LoadOpts, TranscribeOpts};
use crate::{Error, Result};

mod ctx;
mod logging;
mod segments;
mod vad;

use vad::VadPolicy;

/// Built-in engine powered by `whisper-rs` / `whisper.cpp`.
///
/// Owns the ASR model and the Whisper VAD model. Both are loaded once by
/// [`WhisperEngine::load`] and reused for every request.
pub struct WhisperEngine {
    ctx: WhisperContext,
    vad_ctx: WhisperVadContext,
    n_threads: usize,
}

impl WhisperEngine {
    /// Resolve `model` to a file and load it together with the VAD model.
    ///
    /// Both model files are checked before either is loaded. Progress is reported
    /// through `tracing` so it lands on the diagnostic stream.
    pub fn load(model: &ModelId, opts: &LoadOpts) -> Result<Self> {
        let model_path = model.resolve(opts)?;
        let vad_model_path = opts.vad_model_path();
        if !vad_model_path.is_file() {
            return Err(Error::VadModelNotFound(vad_model_path));
        }

        info!(
            model = %model,
            path = %model_path.display(),
            device = ?opts.device,
            precision = ?opts.precision,
            "loading model"
        );
        let started = Instant::now();

        let ctx = ctx::load_context(&model_path, opts)?;
        let vad_ctx = ctx::load_vad_context(&vad_model_path, opts)?;

        info!(
            model = %model,
            vad_model = %vad_model_path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "model loaded"
        );

        Ok(Self {
            ctx,
            vad_ctx,
            n_threads: opts.n_threads,
        })
    }
}

impl Engine for WhisperEngine {
    fn transcribe(&mut self, audio_path: &Path, opts: &TranscribeOpts) -> Result<Transcript> {
        let samples = decode_file(audio_path)?;
        if samples.is_empty() {
            return Ok(Transcript::empty());
        }

        if !opts.enable_voice_activity_detection {
            return Ok(segments::recognize(&self.ctx, opts, self.n_threads, &samples)?);
        }

        let policy = VadPolicy::with_min_silence_ms(opts.min_silence_ms);
        let Some(speech) = vad::detect_speech(&mut self.vad_ctx, &samples, policy)
            .context("voice activity detection failed")?
        else {
            debug!("no speech detected");
            return Ok(Transcript::empty());
        };

        let speech_only = speech.compact(&samples);
        debug!(
            total_seconds = samples.len() as f32 / TARGET_SAMPLE_RATE as f32,
            speech_seconds = speech_only.len() as f32 / TARGET_SAMPLE_RATE as f32,
            "stripped non-speech"
        );

        let mut transcript = segments::recognize(&self.ctx, opts, self.n_threads, &speech_only)?;
        speech.restore_timestamps(&mut transcript.segments);
        Ok(transcript)
    }
}
