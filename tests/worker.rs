//! Background worker integration tests.
//!
//! Failure-path tests run without fixtures; the happy path needs a real
//! video and is gated on `tests/fixtures/sample_video.mp4`
//! (see `tests/fixtures/generate_fixtures.sh`).

use std::path::Path;

use framepick::{
    FramePickError, PipelineOptions,
    worker::{self, PipelineEvent},
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn failed_run_emits_exactly_one_terminal_event() {
    let out = tempfile::tempdir().unwrap();
    let run = worker::spawn(
        "this_file_does_not_exist.mp4",
        out.path(),
        10,
        PipelineOptions::new(),
    );

    let events: Vec<PipelineEvent> = run.events().iter().collect();
    run.join();

    assert_eq!(events.len(), 1, "expected only the terminal event");
    match &events[0] {
        PipelineEvent::Failed(FramePickError::SourceUnavailable { .. }) => {}
        other => panic!("Expected Failed(SourceUnavailable), got: {other:?}"),
    }
}

#[test]
fn invalid_stride_fails_the_run() {
    let out = tempfile::tempdir().unwrap();
    let run = worker::spawn(
        "irrelevant.mp4",
        out.path(),
        0,
        PipelineOptions::new(),
    );

    let events: Vec<PipelineEvent> = run.events().iter().collect();
    run.join();

    assert!(matches!(
        events.as_slice(),
        [PipelineEvent::Failed(FramePickError::InvalidStride)]
    ));
}

#[test]
fn completed_run_streams_progress_then_result() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let out = tempfile::tempdir().unwrap();
    let run = worker::spawn(path, out.path(), 10, PipelineOptions::new());

    let mut saw_extract = false;
    let mut saw_terminal = false;
    for event in run.events() {
        match event {
            PipelineEvent::ExtractProgress { processed, total } => {
                saw_extract = true;
                assert!(processed <= total);
                assert!(!saw_terminal, "progress after terminal event");
            }
            PipelineEvent::SelectProgress { processed, total } => {
                assert!(processed <= total);
                assert!(!saw_terminal, "progress after terminal event");
            }
            PipelineEvent::Completed(_) => {
                saw_terminal = true;
            }
            other => panic!("Unexpected event: {other:?}"),
        }
    }
    run.join();

    assert!(saw_extract, "expected extraction progress");
    assert!(saw_terminal, "expected a Completed event");
}

#[test]
fn cancelled_run_reaches_cancelled_state() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let out = tempfile::tempdir().unwrap();
    let run = worker::spawn(path, out.path(), 10, PipelineOptions::new());
    run.cancel();

    let events: Vec<PipelineEvent> = run.events().iter().collect();
    run.join();

    assert!(
        matches!(events.last(), Some(PipelineEvent::Cancelled)),
        "expected Cancelled terminal event, got: {:?}",
        events.last(),
    );
}
