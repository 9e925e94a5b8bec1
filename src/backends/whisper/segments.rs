use anyhow::{Context, Result};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperSegment, WhisperState};

use crate::engine::{Transcript, UNKNOWN_LANGUAGE};
use crate::opts::TranscribeOpts;
use crate::segments::{Segment, centiseconds_to_seconds};

/// Run recognition over `samples` and collect segments plus the detected language.
pub(super) fn recognize(
    ctx: &WhisperContext,
    opts: &TranscribeOpts,
    n_threads: usize,
    samples: &[f32],
) -> Result<Transcript> {
    let state = run_whisper_full(ctx, opts, n_threads, samples)?;

    let segments = state
        .as_iter()
        .map(to_segment)
        .collect::<Result<Vec<_>>>()?;

    let language = language_code(state.full_lang_id_from_state()).to_owned();

    Ok(Transcript { segments, language })
}

/// Two-letter code for a whisper.cpp language id; negative ids mean "not detected".
fn language_code(id: i32) -> &'static str {
    (id >= 0)
        .then_some(id)
        .and_then(whisper_rs::get_lang_str)
        .unwrap_or(UNKNOWN_LANGUAGE)
}

fn to_segment(segment: WhisperSegment) -> Result<Segment> {
    let text = segment
        .to_str_lossy()
        .context("failed to get segment text")?
        .into_owned();

    Ok(Segment {
        start_seconds: centiseconds_to_seconds(segment.start_timestamp()),
        end_seconds: centiseconds_to_seconds(segment.end_timestamp()),
        text,
    })
}

fn build_full_params(opts: &TranscribeOpts, n_threads: usize) -> FullParams<'static, 'static> {
    let strategy = match opts.beam_size {
        0 | 1 => SamplingStrategy::Greedy { best_of: 1 },
        beam_size => SamplingStrategy::BeamSearch {
            beam_size: beam_size as i32,
            patience: 1.0,
        },
    };
    let mut params = FullParams::new(strategy);

    params.set_n_threads(n_threads.max(1) as i32);
    params.set_translate(false);
    // "auto" asks whisper.cpp to detect the spoken language.
    params.set_language(Some("auto"));
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params
}

fn run_whisper_full(
    ctx: &WhisperContext,
    opts: &TranscribeOpts,
    n_threads: usize,
    samples: &[f32],
) -> Result<WhisperState> {
    let params = build_full_params(opts, n_threads);

    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;

    state
        .full(params, samples)
        .context("failed to run whisper full()")?;

    Ok(state)
}
