//! Voice activity filtering ahead of recognition.
//!
//! VAD finds speech ranges; only those ranges are handed to Whisper, back to
//! back. A [`SpeechMap`] remembers where each range came from so segment
//! timestamps can be moved back onto the original file's timeline.

use anyhow::{Result, anyhow};
use whisper_rs::{WhisperVadContext, WhisperVadParams, WhisperVadSegments};

use crate::audio::TARGET_SAMPLE_RATE;
use crate::segments::Segment;

/// Knobs for speech range selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct VadPolicy {
    /// Speech probability threshold (higher = more conservative).
    pub threshold: f32,

    /// Silence shorter than this doesn't end a speech range.
    pub min_silence_ms: u32,

    /// Speech shorter than this is dropped.
    pub min_speech_ms: u32,

    /// Padding kept on both sides of each speech range.
    pub speech_pad_ms: u32,

    /// Upper bound on a single speech range, in seconds.
    pub max_speech_seconds: f32,
}

impl VadPolicy {
    pub fn with_min_silence_ms(min_silence_ms: u32) -> Self {
        Self {
            min_silence_ms,
            ..Self::default()
        }
    }
}

impl Default for VadPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_silence_ms: 500,
            min_speech_ms: 250,
            speech_pad_ms: 30,
            max_speech_seconds: 30.0,
        }
    }
}

/// Sorted, non-overlapping `[start, end)` sample ranges that hold speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SpeechMap {
    ranges: Vec<(usize, usize)>,
}

impl SpeechMap {
    /// Build a map from arbitrary ranges; empty ranges are dropped and
    /// overlapping or touching ones merged. `None` when nothing is left.
    fn from_ranges(mut ranges: Vec<(usize, usize)>) -> Option<Self> {
        ranges.retain(|&(start, end)| start < end);
        ranges.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        (!merged.is_empty()).then_some(Self { ranges: merged })
    }

    /// Copy the speech ranges of `samples` into one contiguous buffer.
    pub fn compact(&self, samples: &[f32]) -> Vec<f32> {
        let len = self.ranges.iter().map(|(start, end)| end - start).sum();
        let mut out = Vec::with_capacity(len);
        for &(start, end) in &self.ranges {
            out.extend_from_slice(&samples[start..end]);
        }
        out
    }

    /// Map a time in the compacted buffer back to the original file.
    pub fn source_seconds(&self, seconds: f32) -> f32 {
        let rate = TARGET_SAMPLE_RATE as f32;
        let mut remaining = (seconds.max(0.0) * rate).round() as usize;

        for &(start, end) in &self.ranges {
            let len = end - start;
            if remaining < len {
                return (start + remaining) as f32 / rate;
            }
            remaining -= len;
        }

        self.ranges
            .last()
            .map_or(0.0, |&(_, end)| end as f32 / rate)
    }

    /// Rewrite segment timestamps from compacted time to file time.
    pub fn restore_timestamps(&self, segments: &mut [Segment]) {
        for segment in segments {
            segment.start_seconds = self.source_seconds(segment.start_seconds);
            segment.end_seconds = self.source_seconds(segment.end_seconds);
        }
    }
}

/// Locate speech in `samples` (mono, [`TARGET_SAMPLE_RATE`]).
///
/// Returns `None` when no speech was found at all; callers skip recognition.
pub(super) fn detect_speech(
    ctx: &mut WhisperVadContext,
    samples: &[f32],
    policy: VadPolicy,
) -> Result<Option<SpeechMap>> {
    let mut params = WhisperVadParams::default();
    params.set_threshold(policy.threshold);
    params.set_min_silence_duration(policy.min_silence_ms as i32);
    params.set_min_speech_duration(policy.min_speech_ms as i32);
    params.set_speech_pad(policy.speech_pad_ms as i32);
    params.set_max_speech_duration(policy.max_speech_seconds);

    let segments = ctx.segments_from_samples(params, samples)?;
    let ranges = speech_ranges(&segments, samples.len())?;
    Ok(SpeechMap::from_ranges(ranges))
}

/// Sample index ranges for every VAD segment, in order.
fn speech_ranges(segments: &WhisperVadSegments, len: usize) -> Result<Vec<(usize, usize)>> {
    let mut ranges = Vec::new();
    for i in 0..segments.num_segments() {
        // Timestamps are centiseconds.
        let start_cs = segments
            .get_segment_start_timestamp(i)
            .ok_or_else(|| anyhow!("missing start timestamp for VAD segment {i}"))?;
        let end_cs = segments
            .get_segment_end_timestamp(i)
            .ok_or_else(|| anyhow!("missing end timestamp for VAD segment {i}"))?;

        ranges.push(centiseconds_to_range(start_cs, end_cs, len));
    }
    Ok(ranges)
}

/// Convert a centisecond span to a clamped `[start, end)` sample range.
///
/// The start is floored and the end ceiled so the first and last speech samples
/// are both kept.
fn centiseconds_to_range(start_cs: f32, end_cs: f32, len: usize) -> (usize, usize) {
    let rate = TARGET_SAMPLE_RATE as f32;
    let start = ((start_cs.max(0.0) / 100.0) * rate).floor() as usize;
    let end = ((end_cs.max(0.0) / 100.0) * rate).ceil() as usize;

    let start = start.min(len);
    let end = end.min(len).max(start);
    (start, end)
}
