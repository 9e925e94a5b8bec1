/// A contiguous span of recognized speech.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start_seconds: f32,
    pub end_seconds: f32,
    pub text: String,
}

impl Segment {
    pub fn new(start_seconds: f32, end_seconds: f32, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }
}

/// Join segment texts with a single space and trim the result.
///
/// Segment texts are joined verbatim; Whisper segments usually carry their own
/// leading space, which we keep so the output matches what the engine produced.
pub fn transcript_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_owned()
}

pub(crate) fn centiseconds_to_seconds(value: i64) -> f32 {
    if value < 0 { 0.0 } else { value as f32 / 100.0 }
}
