mod support;

use std::fs::File;
use std::io::Cursor;
use std::path::PathBuf;

use transcribe_worker::opts::DEFAULT_VAD_MODEL_FILE;
use transcribe_worker::{Engine, Error, LoadOpts, ModelId, TranscribeOpts, WhisperEngine, Worker};

use support::{write_corrupt_adpcm, write_silence};

fn opts_in(models_dir: PathBuf) -> LoadOpts {
    LoadOpts {
        models_dir,
        ..LoadOpts::default()
    }
}

#[test]
fn load_from_empty_models_dir_is_model_not_found() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let model = ModelId::new("base")?;

    match WhisperEngine::load(&model, &opts_in(dir.path().to_path_buf())) {
        Err(Error::ModelNotFound { model, searched }) => {
            assert_eq!(model, "base");
            assert!(searched.iter().all(|p| p.starts_with(dir.path())));
        }
        Err(other) => panic!("expected ModelNotFound, got {other}"),
        Ok(_) => panic!("loaded a model from an empty directory"),
    }
    Ok(())
}

#[test]
fn load_without_vad_model_fails_before_loading_anything() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // Never parsed: the missing VAD model is reported first.
    File::create(dir.path().join("ggml-base.bin"))?;
    let model = ModelId::new("base")?;

    match WhisperEngine::load(&model, &opts_in(dir.path().to_path_buf())) {
        Err(Error::VadModelNotFound(path)) => {
            assert_eq!(path, dir.path().join(DEFAULT_VAD_MODEL_FILE));
        }
        Err(other) => panic!("expected VadModelNotFound, got {other}"),
        Ok(_) => panic!("loaded without a VAD model"),
    }
    Ok(())
}

#[test]
fn startup_failure_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let model = ModelId::new("base")?;
    let opts = opts_in(dir.path().to_path_buf());

    let mut out = Vec::new();
    let started = Worker::start(
        || WhisperEngine::load(&model, &opts),
        Cursor::new(b"/audio/a.wav\n".to_vec()),
        &mut out,
    );
    assert!(matches!(started, Err(Error::ModelNotFound { .. })));
    drop(started);
    assert!(out.is_empty());
    Ok(())
}

// Model-backed tests expect whisper.cpp models under ./models, like:
//   ./models/ggml-base.bin
//   ./models/ggml-silero-v6.2.0.bin

fn load_local() -> anyhow::Result<WhisperEngine> {
    let opts = LoadOpts {
        models_dir: PathBuf::from("./models"),
        n_threads: 2,
        ..LoadOpts::default()
    };
    Ok(WhisperEngine::load(&ModelId::new("base")?, &opts)?)
}

#[test]
#[ignore = "needs ./models/ggml-base.bin and ./models/ggml-silero-v6.2.0.bin"]
fn silence_is_an_empty_transcript() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("silence.wav");
    write_silence(&path, 16_000, 3.0)?;

    let mut engine = load_local()?;
    let transcript = engine.transcribe(&path, &TranscribeOpts::default())?;
    assert_eq!(transcript.text(), "");
    assert_eq!(transcript.language, "unknown");
    Ok(())
}

#[test]
#[ignore = "needs ./models/ggml-base.bin and ./models/ggml-silero-v6.2.0.bin"]
fn corrupt_audio_is_a_transcription_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("corrupt.wav");
    write_corrupt_adpcm(&path, 8)?;

    let mut engine = load_local()?;
    let err = match engine.transcribe(&path, &TranscribeOpts::default()) {
        Ok(transcript) => panic!("corrupt audio transcribed to {:?}", transcript.text()),
        Err(err) => err,
    };
    assert!(err.to_string().contains("no decodable audio"), "{err}");
    Ok(())
}

#[test]
#[ignore = "needs ./models/ggml-base.bin and ./models/ggml-silero-v6.2.0.bin"]
fn worker_survives_bad_requests_with_a_real_model() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let silence = dir.path().join("silence.wav");
    let corrupt = dir.path().join("corrupt.wav");
    write_silence(&silence, 16_000, 2.0)?;
    write_corrupt_adpcm(&corrupt, 8)?;

    let input = format!(
        "{}\n{}\n{}\nQUIT\n",
        silence.display(),
        corrupt.display(),
        dir.path().join("missing.wav").display()
    );
    let mut out = Vec::new();
    let worker = Worker::start(load_local_engine, Cursor::new(input.into_bytes()), &mut out)?;
    let summary = worker.run()?;
    assert_eq!(summary.served, 3);

    let text = String::from_utf8(out)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "READY");
    assert_eq!(lines[1], r#"{"text":"","language":"unknown"}"#);

    for line in &lines[2..] {
        let value: serde_json::Value = serde_json::from_str(line)?;
        assert_eq!(value["text"], "");
        assert_eq!(value["language"], "unknown");
        assert!(value["error"].is_string(), "{line}");
    }
    Ok(())
}

fn load_local_engine() -> transcribe_worker::Result<WhisperEngine> {
    load_local().map_err(Error::from)
}
