/// Built-in recognition engines.
pub mod whisper;

pub use whisper::WhisperEngine;
