use std::path::Path;

use crate::Result;
use crate::opts::TranscribeOpts;
use crate::segments::{Segment, transcript_text};

/// Language reported when none could be determined.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Pluggable recognition engine driven by [`crate::worker::Worker`].
///
/// An engine is loaded once and then asked to transcribe many audio files. It owns
/// everything between "a path on disk" and "timed text": decoding, resampling,
/// voice activity detection, and recognition.
///
/// `transcribe` takes `&mut self` because engines are free to keep reusable
/// mutable state (whisper-rs's VAD context needs `&mut` to run inference).
pub trait Engine {
    /// Transcribe the audio resource at `audio_path`.
    ///
    /// Any error is scoped to this call; the engine must remain usable afterwards.
    fn transcribe(&mut self, audio_path: &Path, opts: &TranscribeOpts) -> Result<Transcript>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn transcribe(&mut self, audio_path: &Path, opts: &TranscribeOpts) -> Result<Transcript> {
        (**self).transcribe(audio_path, opts)
    }
}

/// The result of a successful transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub segments: Vec<Segment>,

    /// Detected language code (e.g. `"en"`).
    pub language: String,
}

impl Transcript {
    /// A transcript with no speech in it.
    pub fn empty() -> Self {
        Self {
            segments: Vec::new(),
            language: UNKNOWN_LANGUAGE.to_owned(),
        }
    }

    /// The concatenated transcript text.
    pub fn text(&self) -> String {
        transcript_text(&self.segments)
    }
}
