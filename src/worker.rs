//! The resident worker: load once, then serve requests until told to stop.
//!
//! Lifecycle:
//! - `Worker::start` loads the engine and writes `READY` (nothing is written if
//!   loading fails).
//! - `Worker::run` reads one request, transcribes it, writes one response, and
//!   repeats until end of input or a `QUIT`/empty line.
//!
//! Requests are served strictly one at a time. A failing transcription is folded
//! into its response and never ends the loop; only I/O failures on the protocol
//! streams themselves do.

use std::any::Any;
use std::io::{BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::Result;
use crate::engine::Engine;
use crate::opts::TranscribeOpts;
use crate::protocol::{
    Request, Response, TranscribeOutcome, read_request, write_ready, write_response,
};

/// Why the request loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// The input stream was closed.
    EndOfInput,

    /// A `QUIT` or empty line was received.
    Quit,
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub shutdown: Shutdown,

    /// Number of responses written.
    pub served: u64,
}

/// Owns the loaded engine and both protocol streams.
pub struct Worker<E, R, W> {
    engine: E,
    opts: TranscribeOpts,
    input: R,
    output: W,
    served: u64,
}

impl<E, R, W> Worker<E, R, W>
where
    E: Engine,
    R: BufRead,
    W: Write,
{
    /// Load the engine and announce readiness.
    ///
    /// `load` runs exactly once. On failure its error is returned untouched and
    /// nothing is written to `output`.
    pub fn start<F>(load: F, input: R, mut output: W) -> Result<Self>
    where
        F: FnOnce() -> Result<E>,
    {
        let engine = load()?;

        write_ready(&mut output)?;
        info!("ready for requests");

        Ok(Self {
            engine,
            opts: TranscribeOpts::default(),
            input,
            output,
            served: 0,
        })
    }

    /// Serve requests until end of input or a stop sentinel.
    pub fn run(mut self) -> Result<Summary> {
        loop {
            if let Some(shutdown) = self.step()? {
                info!(?shutdown, served = self.served, "request loop finished");
                return Ok(Summary {
                    shutdown,
                    served: self.served,
                });
            }
        }
    }

    /// Handle a single input line.
    ///
    /// Returns `Some(_)` when the loop should stop; no response is written for
    /// the line that stopped it.
    pub fn step(&mut self) -> Result<Option<Shutdown>> {
        let path = match read_request(&mut self.input)? {
            None => return Ok(Some(Shutdown::EndOfInput)),
            Some(Request::Quit) => return Ok(Some(Shutdown::Quit)),
            Some(Request::Transcribe(path)) => path,
        };

        let seq = self.served + 1;
        let span = info_span!("request", seq, path = %path.display());
        let _enter = span.enter();

        let outcome = self.transcribe(&path);
        write_response(&mut self.output, &Response::from(outcome))?;
        self.served = seq;
        Ok(None)
    }

    /// Number of responses written so far.
    pub fn served(&self) -> u64 {
        self.served
    }

    #[cfg(test)]
    fn engine(&self) -> &E {
        &self.engine
    }

    fn transcribe(&mut self, path: &Path) -> TranscribeOutcome {
        let started = Instant::now();

        let engine = &mut self.engine;
        let opts = &self.opts;
        let res = panic::catch_unwind(AssertUnwindSafe(|| engine.transcribe(path, opts)));
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match res {
            Ok(Ok(transcript)) => {
                info!(
                    elapsed_ms,
                    segments = transcript.segments.len(),
                    language = %transcript.language,
                    "transcribed"
                );
                transcript.into()
            }
            Ok(Err(err)) => {
                warn!(elapsed_ms, error = %err, "transcription failed");
                TranscribeOutcome::Failure {
                    description: err.to_string(),
                }
            }
            Err(payload) => {
                let description = format!("transcription panicked: {}", panic_message(&*payload));
                warn!(elapsed_ms, error = %description, "transcription failed");
                TranscribeOutcome::Failure { description }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
