//! PCM normalization: interleaved decoder output -> mono -> 16 kHz.

use anyhow::{Context, Result, anyhow, bail};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};

use super::TARGET_SAMPLE_RATE;

/// Source frames fed to the resampler per `process()` call.
const RESAMPLE_BLOCK_FRAMES: usize = 2048;

/// Collects decoded buffers as mono `f32` at the source rate.
#[derive(Default)]
pub(crate) struct MonoCollector {
    scratch: Option<SampleBuffer<f32>>,
    source_rate: Option<u32>,
    mono: Vec<f32>,
}

impl MonoCollector {
    /// Append one decoded buffer, downmixing to mono.
    pub fn push(&mut self, decoded: AudioBufferRef<'_>) -> Result<()> {
        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            bail!("decoded audio had zero channels");
        }

        match self.source_rate {
            None => self.source_rate = Some(spec.rate),
            Some(rate) if rate != spec.rate => {
                bail!("sample rate changed mid-stream ({rate} Hz -> {} Hz)", spec.rate)
            }
            Some(_) => {}
        }

        let frames = decoded.capacity() as u64;
        let needs_new_scratch = self
            .scratch
            .as_ref()
            .is_none_or(|buf| (buf.capacity() as u64) < frames * channels as u64);
        if needs_new_scratch {
            self.scratch = Some(SampleBuffer::<f32>::new(frames, spec));
        }

        let scratch = self
            .scratch
            .as_mut()
            .ok_or_else(|| anyhow!("sample buffer not initialized"))?;
        scratch.copy_interleaved_ref(decoded);

        downmix_into(scratch.samples(), channels, &mut self.mono);
        Ok(())
    }

    /// Mono frames collected so far, at the source rate.
    pub fn frames(&self) -> usize {
        self.mono.len()
    }

    /// Finish collection and return mono samples at [`TARGET_SAMPLE_RATE`].
    pub fn finish(self) -> Result<Vec<f32>> {
        match self.source_rate {
            None => Ok(Vec::new()),
            Some(TARGET_SAMPLE_RATE) => Ok(self.mono),
            Some(rate) => resample_mono(&self.mono, rate, TARGET_SAMPLE_RATE),
        }
    }
}

/// Average interleaved frames into mono and append them to `out`.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

/// Resample a whole mono buffer.
///
/// The input is fed in zero-padded blocks until the resampler has produced its
/// filter delay plus the length the rate ratio implies. The delay is then cut from
/// the front so output sample 0 lines up with input sample 0.
fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() || from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        RESAMPLE_BLOCK_FRAMES,
        1,
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(delay + expected + RESAMPLE_BLOCK_FRAMES * 2);
    let mut block = vec![0.0f32; RESAMPLE_BLOCK_FRAMES];
    let mut chunks = samples.chunks(RESAMPLE_BLOCK_FRAMES);

    while out.len() < delay + expected {
        // Past the end of the input, keep flushing silence through the filter.
        let chunk = chunks.next().unwrap_or(&[]);
        block[..chunk.len()].copy_from_slice(chunk);
        block[chunk.len()..].fill(0.0);

        let resampled = resampler
            .process(&[&block[..]], None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        let Some(channel) = resampled.first() else {
            bail!("expected mono output from resampler");
        };
        if channel.is_empty() {
            bail!("resampler produced no output");
        }
        out.extend_from_slice(channel);
    }

    out.drain(..delay);
    out.truncate(expected);
    Ok(out)
}
