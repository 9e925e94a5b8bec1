//! Container probing and packet iteration on top of Symphonia.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// An opened media file positioned on its first decodable audio track.
pub(crate) struct AudioSource {
    pub format: Box<dyn FormatReader>,
    pub track: Track,
}

impl AudioSource {
    /// Open `path` and pick the first track that looks like decodable audio.
    ///
    /// The file extension, when present, is passed to the prober as a hint.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open audio file '{}'", path.display()))?;

        let mss = MediaSourceStream::new(
            Box::new(file),
            MediaSourceStreamOptions {
                // Symphonia wants a power-of-two buffer above 32 KiB.
                buffer_len: 256 * 1024,
            },
        );

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("unsupported or corrupt audio in '{}'", path.display()))?;

        let format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
            .cloned()
            .ok_or_else(|| anyhow!("no audio track found in '{}'", path.display()))?;

        Ok(Self { format, track })
    }

    /// Build a decoder for the selected track.
    pub fn decoder(&self) -> Result<Box<dyn Decoder>> {
        symphonia::default::get_codecs()
            .make(&self.track.codec_params, &DecoderOptions::default())
            .map_err(|e| anyhow!(e))
            .context("failed to create decoder for audio track")
    }

    /// Frame count the container declares for the track, when it declares one.
    pub fn expected_frames(&self) -> Option<u64> {
        self.track.codec_params.n_frames
    }

    /// Next packet belonging to the selected track, or `None` at end of stream.
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            match self.format.next_packet() {
                Ok(packet) if packet.track_id() == self.track.id => return Ok(Some(packet)),
                Ok(_) => continue,
                // Symphonia reports the end of a file as an unexpected EOF.
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(e) => return Err(anyhow!(e)).context("failed reading packet"),
            }
        }
    }
}
