//! Line protocol spoken with the parent process.
//!
//! - stdin: one request per line (an audio path, `QUIT`, or an empty line)
//! - stdout: `READY` once, then one JSON [`Response`] per accepted request
//!
//! Every line written here is flushed immediately: the parent blocks on reading
//! it and must not wait on our buffering.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::Result;
use crate::engine::{Transcript, UNKNOWN_LANGUAGE};

/// Written once after the engine has loaded.
pub const READY_LINE: &str = "READY";

/// Input line that asks the worker to stop.
pub const QUIT_COMMAND: &str = "QUIT";

/// A single parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `QUIT` or an empty line.
    Quit,

    /// Transcribe the audio resource at this path.
    Transcribe(PathBuf),
}

impl Request {
    /// Interpret one raw input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() || line == QUIT_COMMAND {
            return Self::Quit;
        }
        Self::Transcribe(PathBuf::from(line))
    }
}

/// Read the next request.
///
/// Returns `Ok(None)` at end of input. Bytes that are not valid UTF-8 are
/// replaced rather than rejected, so a garbled line becomes a failing request
/// instead of killing the worker.
pub fn read_request<R: BufRead>(input: &mut R) -> Result<Option<Request>> {
    let mut buf = Vec::new();
    if input.read_until(b'\n', &mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(Request::parse(&String::from_utf8_lossy(&buf))))
}

/// Outcome of one transcription, before it is encoded on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscribeOutcome {
    Success { text: String, language: String },
    Failure { description: String },
}

impl From<Transcript> for TranscribeOutcome {
    fn from(transcript: Transcript) -> Self {
        Self::Success {
            text: transcript.text(),
            language: transcript.language,
        }
    }
}

/// One JSON result line.
///
/// Example output:
/// ```json
/// {"text":"Hello world","language":"en"}
/// {"text":"","language":"unknown","error":"failed to open audio file '/a/bad.wav'"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub text: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<TranscribeOutcome> for Response {
    fn from(outcome: TranscribeOutcome) -> Self {
        match outcome {
            TranscribeOutcome::Success { text, language } => Self {
                text,
                language,
                error: None,
            },
            TranscribeOutcome::Failure { description } => Self {
                text: String::new(),
                language: UNKNOWN_LANGUAGE.to_owned(),
                error: Some(description),
            },
        }
    }
}

/// Write the readiness sentinel.
pub fn write_ready<W: Write>(out: &mut W) -> Result<()> {
    write_line(out, READY_LINE)
}

/// Serialize `response` as a single JSON line.
pub fn write_response<W: Write>(out: &mut W, response: &Response) -> Result<()> {
    let json = serde_json::to_string(response)?;
    write_line(out, &json)
}

fn write_line<W: Write>(out: &mut W, line: &str) -> Result<()> {
    out.write_all(line.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::segments::Segment;

    #[test]
    fn sentinels_stop_and_everything_else_is_a_path() {
        assert_eq!(Request::parse(""), Request::Quit);
        assert_eq!(Request::parse("   \t\r\n"), Request::Quit);
        assert_eq!(Request::parse("QUIT\n"), Request::Quit);
        assert_eq!(Request::parse("  QUIT  "), Request::Quit);
        assert_eq!(
            Request::parse("quit"),
            Request::Transcribe(PathBuf::from("quit"))
        );
        assert_eq!(
            Request::parse("  /audio/a b.wav \r\n"),
            Request::Transcribe(PathBuf::from("/audio/a b.wav"))
        );
    }

    #[test]
    fn read_request_handles_eof_and_missing_newline() -> anyhow::Result<()> {
        let mut input = Cursor::new(b"/a.wav\n/b.wav".to_vec());
        assert_eq!(
            read_request(&mut input)?,
            Some(Request::Transcribe(PathBuf::from("/a.wav")))
        );
        assert_eq!(
            read_request(&mut input)?,
            Some(Request::Transcribe(PathBuf::from("/b.wav")))
        );
        assert_eq!(read_request(&mut input)?, None);
        Ok(())
    }

    #[test]
    fn read_request_tolerates_invalid_utf8() -> anyhow::Result<()> {
        let mut input = Cursor::new(b"/audio/\xff.wav\n".to_vec());
        match read_request(&mut input)? {
            Some(Request::Transcribe(path)) => {
                assert!(path.to_string_lossy().starts_with("/audio/"));
            }
            other => panic!("expected a transcribe request, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn success_response_omits_error_field() -> anyhow::Result<()> {
        let transcript = Transcript {
            segments: vec![
                Segment::new(0.0, 0.4, "Hello"),
                Segment::new(0.4, 0.9, "world"),
            ],
            language: "en".to_owned(),
        };
        let response = Response::from(TranscribeOutcome::from(transcript));

        let mut out = Vec::new();
        write_response(&mut out, &response)?;
        assert_eq!(
            String::from_utf8(out)?,
            "{\"text\":\"Hello world\",\"language\":\"en\"}\n"
        );
        Ok(())
    }

    #[test]
    fn failure_response_carries_description() -> anyhow::Result<()> {
        let response = Response::from(TranscribeOutcome::Failure {
            description: "failed to open audio file".to_owned(),
        });

        let mut out = Vec::new();
        write_response(&mut out, &response)?;
        assert_eq!(
            String::from_utf8(out)?,
            "{\"text\":\"\",\"language\":\"unknown\",\"error\":\"failed to open audio file\"}\n"
        );
        Ok(())
    }

    #[test]
    fn ready_is_a_bare_line() -> anyhow::Result<()> {
        let mut out = Vec::new();
        write_ready(&mut out)?;
        assert_eq!(out, b"READY\n");
        Ok(())
    }
}
