//! Audio file decoding for the recognition engine.
//!
//! Any container/codec Symphonia can probe is accepted. Output is always mono
//! `f32` in `[-1.0, 1.0]` at [`TARGET_SAMPLE_RATE`], which is what whisper.cpp expects.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use symphonia::core::errors::Error as SymphoniaError;
use tracing::{debug, warn};

mod demux;
mod pipeline;

use demux::AudioSource;
use pipeline::MonoCollector;

/// Sample rate (Hz) every decoded file is converted to.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Decode the audio file at `path` into mono samples at [`TARGET_SAMPLE_RATE`].
///
/// Corrupt packets are skipped. A file that can't be opened or probed, or whose
/// packets all fail to decode, is an error. A container with no packets at all
/// decodes to an empty buffer.
pub fn decode_file(path: &Path) -> Result<Vec<f32>> {
    let mut source = AudioSource::open(path)?;
    let mut decoder = source.decoder()?;
    let mut collector = MonoCollector::default();
    let mut decoded = 0usize;
    let mut skipped = 0usize;

    while let Some(packet) = source.next_packet()? {
        match decoder.decode(&packet) {
            Ok(buf) => {
                collector
                    .push(buf)
                    .context("failed to normalize decoded audio")?;
                decoded += 1;
            }
            // A short read inside one packet is packet corruption, not end of stream.
            Err(SymphoniaError::DecodeError(_) | SymphoniaError::IoError(_)) => skipped += 1,
            Err(e) => return Err(anyhow!(e)).context("decoder failure"),
        }
    }

    if decoded == 0 && skipped > 0 {
        bail!(
            "no decodable audio in '{}' ({skipped} corrupt packets)",
            path.display()
        );
    }

    let frames = collector.frames() as u64;
    let truncated = source.expected_frames().filter(|&expected| frames < expected);
    if let Some(expected) = truncated {
        warn!(
            path = %path.display(),
            expected_frames = expected,
            decoded_frames = frames,
            skipped_packets = skipped,
            "audio ended before its declared length"
        );
    }

    let samples = collector.finish()?;
    debug!(
        path = %path.display(),
        samples = samples.len(),
        skipped_packets = skipped,
        "decoded audio"
    );
    Ok(samples)
}
