use std::path::PathBuf;

/// Default directory searched for `ggml-*.bin` model files.
pub const DEFAULT_MODELS_DIR: &str = "./models";

/// File name of the Whisper VAD model looked up in the models directory.
pub const DEFAULT_VAD_MODEL_FILE: &str = "ggml-silero-v6.2.0.bin";

/// Where the engine runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Device {
    /// Plain CPU execution; works on every host.
    #[default]
    Cpu,
}

/// Numeric precision the engine computes with.
///
/// whisper.cpp has no runtime precision switch; precision is a property of the
/// model file, so `Reduced` selects an 8-bit quantized artifact when one exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Precision {
    #[default]
    Reduced,
    Full,
}

/// Options that control how the engine is loaded.
///
/// Like [`TranscribeOpts`], this is library-level configuration; the binary maps
/// CLI flags and environment variables into it.
#[derive(Debug, Clone)]
pub struct LoadOpts {
    pub device: Device,
    pub precision: Precision,

    /// Directory holding `ggml-<model>.bin` files.
    pub models_dir: PathBuf,

    /// Explicit Whisper VAD model path. When `None`, we use
    /// [`DEFAULT_VAD_MODEL_FILE`] inside `models_dir`.
    pub vad_model_path: Option<PathBuf>,

    /// Threads whisper.cpp may use per transcription.
    pub n_threads: usize,
}

impl Default for LoadOpts {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            precision: Precision::Reduced,
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            vad_model_path: None,
            n_threads: num_cpus::get(),
        }
    }
}

impl LoadOpts {
    /// The VAD model path this configuration resolves to.
    pub fn vad_model_path(&self) -> PathBuf {
        self.vad_model_path
            .clone()
            .unwrap_or_else(|| self.models_dir.join(DEFAULT_VAD_MODEL_FILE))
    }
}

/// Options that control how a single transcription is performed.
///
/// The worker uses [`TranscribeOpts::default`] for every request; the values are
/// fixed for throughput rather than peak accuracy.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeOpts {
    /// Decoding breadth. `1` means greedy decoding.
    pub beam_size: usize,

    /// Whether to run voice activity detection before recognition.
    ///
    /// When enabled, non-speech regions are cut out before recognition and, if
    /// no speech is found at all, recognition is skipped.
    pub enable_voice_activity_detection: bool,

    /// Silence shorter than this does not split speech regions.
    pub min_silence_ms: u32,
}

impl Default for TranscribeOpts {
    fn default() -> Self {
        Self {
            beam_size: 1,
            enable_voice_activity_detection: true,
            min_silence_ms: 500,
        }
    }
}
