//! WAV fixtures shared by the integration tests.

#![allow(dead_code)]

use std::f32::consts::PI;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// 16-bit PCM sine at 440 Hz, the same value on every channel.
pub fn write_tone(path: &Path, sample_rate: u32, channels: u16, seconds: f32) -> anyhow::Result<()> {
    write_pcm(path, sample_rate, channels, seconds, |t| {
        0.5 * (2.0 * PI * 440.0 * t).sin()
    })
}

/// 16-bit PCM digital silence.
pub fn write_silence(path: &Path, sample_rate: u32, seconds: f32) -> anyhow::Result<()> {
    write_pcm(path, sample_rate, 1, seconds, |_| 0.0)
}

fn write_pcm(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    seconds: f32,
    signal: impl Fn(f32) -> f32,
) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;

    let frames = (sample_rate as f32 * seconds) as usize;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let value = (signal(t) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()?;
    Ok(())
}

/// A well-formed IMA ADPCM WAV container in which every block is corrupt.
///
/// Each block's header carries a step index above 88, which no decoder accepts,
/// so the container opens fine but not a single packet decodes.
pub fn write_corrupt_adpcm(path: &Path, blocks: usize) -> anyhow::Result<()> {
    const WAVE_FORMAT_IMA_ADPCM: u16 = 0x0011;
    const BLOCK_ALIGN: u16 = 256;
    // (256 - 4) * 8 / 4 + 1
    const FRAMES_PER_BLOCK: u16 = 505;
    const SAMPLE_RATE: u32 = 16_000;

    let data_len = u32::from(BLOCK_ALIGN) * blocks as u32;
    let fmt_len = 20u32;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(4 + 8 + fmt_len + 8 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&fmt_len.to_le_bytes());
    bytes.extend_from_slice(&WAVE_FORMAT_IMA_ADPCM.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    let bytes_per_sec = SAMPLE_RATE * u32::from(BLOCK_ALIGN) / u32::from(FRAMES_PER_BLOCK);
    bytes.extend_from_slice(&bytes_per_sec.to_le_bytes());
    bytes.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&FRAMES_PER_BLOCK.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for _ in 0..blocks {
        let mut block = [0u8; BLOCK_ALIGN as usize];
        // predictor (2 bytes), step index, reserved
        block[2] = 0xFF;
        bytes.extend_from_slice(&block);
    }

    std::fs::write(path, bytes)?;
    Ok(())
}
