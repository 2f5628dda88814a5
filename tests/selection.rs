//! Best-frame selection integration tests.
//!
//! Frame directories are synthesised with the `image` crate in temp dirs —
//! no media fixtures required.

use std::path::Path;
use std::sync::{Arc, Mutex};

use framepick::{
    CancellationToken, FramePickError, PipelineOptions, PoseGate, ProgressCallback,
};
use image::{DynamicImage, RgbImage};

fn solid(rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(24, 24, image::Rgb(rgb)))
}

fn gradient() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(24, 24, |x, y| {
        image::Rgb([(x * 9 % 256) as u8, (y * 5 % 256) as u8, 77])
    }))
}

fn write_frame(dir: &Path, index: u64, image: &DynamicImage) {
    image
        .save(dir.join(format!("frame_{index}.jpg")))
        .expect("Failed to write frame");
}

/// Records every `(processed, total)` pair it receives.
struct RecordingProgress {
    pairs: Mutex<Vec<(u64, u64)>>,
}

impl RecordingProgress {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            pairs: Mutex::new(Vec::new()),
        })
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, processed: u64, total: u64) {
        self.pairs.lock().unwrap().push((processed, total));
    }
}

/// A pose gate that rejects every frame.
struct RejectAll;

impl PoseGate for RejectAll {
    fn admits(&self, _frame: &DynamicImage) -> bool {
        false
    }
}

#[test]
fn pixel_identical_candidate_wins_with_infinite_score() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let reference = gradient();
    write_frame(frames.path(), 0, &reference);
    write_frame(frames.path(), 10, &solid([200, 10, 10]));
    write_frame(frames.path(), 20, &solid([10, 200, 10]));
    // Same pixels as the reference -> identical JPEG bytes -> MSE 0.
    write_frame(frames.path(), 50, &reference);

    let result =
        framepick::select_best_frame(frames.path(), out.path(), &PipelineOptions::new())
            .expect("selection failed");

    assert_eq!(result.best_index, Some(50));
    assert!(result.best_score.is_infinite());
    assert_eq!(result.scored, 3);
    assert_eq!(result.skipped, 0);

    let copied = result.best_frame_path.expect("winner should be copied");
    assert!(copied.ends_with("best_frame_with_pose/frame_50.jpg"));
    assert!(copied.exists());
}

#[test]
fn zero_candidates_is_not_an_error() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 0, &gradient());

    let recorder = RecordingProgress::new();
    let options = PipelineOptions::new().with_progress(recorder.clone());
    let result = framepick::select_best_frame(frames.path(), out.path(), &options)
        .expect("selection failed");

    assert_eq!(result.best_index, None);
    assert_eq!(result.best_frame_path, None);
    assert_eq!(result.best_score, 0.0);
    assert!(recorder.pairs.lock().unwrap().is_empty());
    assert!(!out.path().join("best_frame_with_pose").exists());
}

#[test]
fn missing_reference_aborts_before_scanning() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 10, &gradient());

    let recorder = RecordingProgress::new();
    let options = PipelineOptions::new().with_progress(recorder.clone());
    let result = framepick::select_best_frame(frames.path(), out.path(), &options);

    assert!(matches!(
        result,
        Err(FramePickError::ReferenceUnavailable { .. })
    ));
    // No scan happened, so no progress was reported.
    assert!(recorder.pairs.lock().unwrap().is_empty());
}

#[test]
fn corrupt_reference_aborts_before_scanning() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    std::fs::write(frames.path().join("frame_0.jpg"), b"not an image").unwrap();
    write_frame(frames.path(), 10, &gradient());

    let result =
        framepick::select_best_frame(frames.path(), out.path(), &PipelineOptions::new());
    assert!(matches!(
        result,
        Err(FramePickError::ReferenceUnavailable { .. })
    ));
}

#[test]
fn unreadable_candidates_are_skipped_not_fatal() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 0, &gradient());
    write_frame(frames.path(), 10, &solid([50, 60, 70]));
    std::fs::write(frames.path().join("frame_20.jpg"), b"garbage").unwrap();
    write_frame(frames.path(), 30, &solid([90, 10, 30]));

    let recorder = RecordingProgress::new();
    let options = PipelineOptions::new().with_progress(recorder.clone());
    let result = framepick::select_best_frame(frames.path(), out.path(), &options)
        .expect("selection should absorb candidate failures");

    assert_eq!(result.scored, 2);
    assert_eq!(result.skipped, 1);
    assert!(result.best_index.is_some());
    assert_ne!(result.best_index, Some(20));

    // Progress still covered every candidate, skipped one included.
    let pairs = recorder.pairs.lock().unwrap();
    assert_eq!(*pairs, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn shape_mismatched_candidates_are_skipped() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 0, &gradient());
    write_frame(frames.path(), 10, &solid([50, 60, 70]));
    let oversized = DynamicImage::ImageRgb8(RgbImage::from_pixel(
        48,
        48,
        image::Rgb([50, 60, 70]),
    ));
    write_frame(frames.path(), 20, &oversized);

    let result =
        framepick::select_best_frame(frames.path(), out.path(), &PipelineOptions::new())
            .expect("selection should absorb shape mismatches");

    assert_eq!(result.scored, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.best_index, Some(10));
}

#[test]
fn tie_break_is_first_seen() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 0, &solid([100, 100, 100]));
    // Two byte-identical candidates -> exactly equal scores.
    let near = solid([101, 101, 101]);
    write_frame(frames.path(), 10, &near);
    write_frame(frames.path(), 20, &near);

    let result =
        framepick::select_best_frame(frames.path(), out.path(), &PipelineOptions::new())
            .expect("selection failed");

    assert_eq!(result.best_index, Some(10));
}

#[test]
fn selection_is_deterministic() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 0, &gradient());
    write_frame(frames.path(), 10, &solid([1, 2, 3]));
    write_frame(frames.path(), 20, &solid([200, 150, 90]));
    write_frame(frames.path(), 30, &solid([90, 90, 90]));

    let first =
        framepick::select_best_frame(frames.path(), out.path(), &PipelineOptions::new())
            .expect("first run failed");
    let second =
        framepick::select_best_frame(frames.path(), out.path(), &PipelineOptions::new())
            .expect("second run failed");

    assert_eq!(first.best_index, second.best_index);
    assert_eq!(first.best_score, second.best_score);
}

#[test]
fn configurable_reference_index() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let target = gradient();
    write_frame(frames.path(), 0, &solid([10, 10, 10]));
    write_frame(frames.path(), 10, &target);
    write_frame(frames.path(), 20, &target);

    let options = PipelineOptions::new().with_reference_index(10);
    let result = framepick::select_best_frame(frames.path(), out.path(), &options)
        .expect("selection failed");

    // Candidates are 0 and 20; 20 is identical to the new reference.
    assert_eq!(result.best_index, Some(20));
    assert!(result.best_score.is_infinite());
}

#[test]
fn pose_gate_rejections_count_as_skips() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 0, &gradient());
    write_frame(frames.path(), 10, &gradient());
    write_frame(frames.path(), 20, &solid([1, 2, 3]));

    let options = PipelineOptions::new().with_pose_gate(Arc::new(RejectAll));
    let result = framepick::select_best_frame(frames.path(), out.path(), &options)
        .expect("selection failed");

    assert_eq!(result.best_index, None);
    assert_eq!(result.scored, 0);
    assert_eq!(result.skipped, 2);
}

#[test]
fn cancelled_selection_returns_error() {
    let frames = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_frame(frames.path(), 0, &gradient());
    write_frame(frames.path(), 10, &solid([5, 5, 5]));

    let token = CancellationToken::new();
    token.cancel(); // Cancel immediately.

    let options = PipelineOptions::new().with_cancellation(token);
    let result = framepick::select_best_frame(frames.path(), out.path(), &options);

    assert!(matches!(result, Err(FramePickError::Cancelled)));
}
