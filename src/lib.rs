//! `transcribe-worker`: a resident Whisper process for parent processes that
//! transcribe many short audio files.
//!
//! Loading a model is expensive; transcribing a short clip is not. The worker loads
//! the model once, prints `READY`, then reads one audio path per line on stdin and
//! answers each with one JSON line on stdout:
//!
//! ```text
//! > /audio/a.wav
//! < {"text":"Hello world","language":"en"}
//! > /audio/bad.wav
//! < {"text":"","language":"unknown","error":"failed to open audio file '/audio/bad.wav': ..."}
//! > QUIT
//! ```
//!
//! The library is split so the protocol can be driven without a real model:
//! [`Worker`] is generic over any [`Engine`], and [`WhisperEngine`] is the
//! whisper.cpp-backed implementation the binary uses.

// Request loop and wire format.
pub mod protocol;
pub mod worker;

// Recognition engine seam and the built-in engine.
pub mod backends;
pub mod engine;

// Library-level configuration.
pub mod model;
pub mod opts;

// Audio decoding and transcript assembly.
pub mod audio;
pub mod segments;

// Diagnostics.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use backends::WhisperEngine;
pub use engine::{Engine, Transcript};
pub use error::{Error, Result};
#[cfg(feature = "logging")]
pub use logging::{LogFormat, init as init_logging};
pub use model::ModelId;
pub use opts::{LoadOpts, TranscribeOpts};
pub use worker::{Shutdown, Summary, Worker};
