//! Best-frame selection.
//!
//! [`select_best_frame`] scans a directory of stored frames, scores every
//! candidate against a reference frame with [`crate::quality::score`], and
//! tracks the running maximum of the composite score. The reference is the
//! stored frame whose index matches
//! [`PipelineOptions::with_reference_index`](crate::PipelineOptions::with_reference_index)
//! (default 0, i.e. `frame_0.jpg`); the reference itself is never a
//! candidate.
//!
//! A run moves through reference loading, then a single scan pass, then a
//! terminal outcome. Failures before the scan (missing reference) abort the
//! run; failures on individual candidates (unreadable file, shape mismatch,
//! pose gate rejection) are absorbed: the candidate is skipped, counted,
//! logged, and progress still fires for it.
//!
//! No locking is performed; concurrent runs must not share an output root,
//! or their winner files will collide.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    error::FramePickError,
    options::PipelineOptions,
    quality,
    store::{self, StoredFrame},
};

/// Name of the directory the winning frame is copied into, under the output
/// root. Part of the on-disk contract other tools rely on.
const BEST_FRAME_DIR: &str = "best_frame_with_pose";

/// Outcome of a selection run.
///
/// Starts as "no winner" (score 0, no index) and is only ever replaced by
/// strictly better candidates during the scan. Immutable once returned.
#[derive(Debug, Clone)]
#[must_use]
pub struct SelectionResult {
    /// Index of the winning frame, or `None` if no candidate ever beat the
    /// initial score.
    pub best_index: Option<u64>,
    /// Composite score of the winner; 0.0 when there is no winner.
    pub best_score: f64,
    /// Where the winning frame was copied to, or `None` without a winner.
    pub best_frame_path: Option<PathBuf>,
    /// Number of candidates successfully scored.
    pub scored: u64,
    /// Number of candidates skipped (unreadable, mismatched, or gated out).
    pub skipped: u64,
}

impl SelectionResult {
    fn no_winner() -> Self {
        Self {
            best_index: None,
            best_score: 0.0,
            best_frame_path: None,
            scored: 0,
            skipped: 0,
        }
    }
}

/// Scan `frame_dir` and pick the frame most similar to the reference frame.
///
/// Candidates are visited in ascending index order. A candidate replaces the
/// running best only when its composite score is **strictly greater** — the
/// first-seen candidate wins ties, which makes re-runs over an unchanged
/// directory deterministic. The configured progress callback fires after
/// every candidate, skipped ones included, with a `processed` counter that
/// increases by exactly 1 each time.
///
/// On completion the winning frame is copied to
/// `{output_root}/best_frame_with_pose/{original_filename}` and the copy's
/// path is returned in the result. Zero scored candidates is not an error:
/// the result simply carries no winner.
///
/// # Errors
///
/// - [`FramePickError::ReferenceUnavailable`] if the reference frame is
///   missing or unreadable — the scan never starts.
/// - [`FramePickError::Cancelled`] if the options' token is cancelled
///   between candidates.
/// - I/O errors from listing the directory or copying the winner.
pub fn select_best_frame<P: AsRef<Path>, Q: AsRef<Path>>(
    frame_dir: P,
    output_root: Q,
    options: &PipelineOptions,
) -> Result<SelectionResult, FramePickError> {
    let frame_dir = frame_dir.as_ref();
    let output_root = output_root.as_ref();

    log::debug!(
        "Selecting best frame in {} (reference index {})",
        frame_dir.display(),
        options.reference_index,
    );

    let frames = store::list_frames(frame_dir)?;

    // Load the reference once, before any scanning.
    let reference_path = frames
        .iter()
        .find(|frame| frame.index == options.reference_index)
        .map(|frame| frame.path.clone())
        .ok_or_else(|| FramePickError::ReferenceUnavailable {
            path: frame_dir.join(format!("frame_{}.jpg", options.reference_index)),
            reason: "no stored frame with the reference index".to_string(),
        })?;
    let reference =
        image::open(&reference_path).map_err(|error| FramePickError::ReferenceUnavailable {
            path: reference_path.clone(),
            reason: error.to_string(),
        })?;

    let candidates: Vec<&StoredFrame> = frames
        .iter()
        .filter(|frame| frame.index != options.reference_index)
        .collect();
    let total = candidates.len() as u64;

    let mut result = SelectionResult::no_winner();
    let mut best_source: Option<&StoredFrame> = None;

    for (position, &candidate) in candidates.iter().enumerate() {
        if options.is_cancelled() {
            return Err(FramePickError::Cancelled);
        }

        match score_candidate(&reference, candidate, options) {
            Ok(Some(combined)) => {
                result.scored += 1;
                if combined > result.best_score {
                    result.best_score = combined;
                    result.best_index = Some(candidate.index);
                    best_source = Some(candidate);
                }
            }
            Ok(None) => {
                // Pose gate rejected the frame.
                result.skipped += 1;
            }
            Err(error) if error.is_skippable() => {
                log::warn!(
                    "Skipping frame {}: {error}",
                    candidate.path.display(),
                );
                result.skipped += 1;
            }
            Err(error) => return Err(error),
        }

        options
            .progress
            .on_progress(position as u64 + 1, total);
    }

    // Persist the winner, keyed by its original filename.
    if let Some(winner) = best_source {
        let best_dir = output_root.join(BEST_FRAME_DIR);
        fs::create_dir_all(&best_dir)?;
        let file_name = winner
            .path
            .file_name()
            .ok_or_else(|| FramePickError::FrameDecode("winning frame has no filename".into()))?;
        let destination = best_dir.join(file_name);
        fs::copy(&winner.path, &destination)?;
        result.best_frame_path = Some(destination);
    }

    log::info!(
        "Selection complete: best_index={:?}, best_score={:.3}, scored={}, skipped={}",
        result.best_index,
        result.best_score,
        result.scored,
        result.skipped,
    );

    Ok(result)
}

/// Load and score one candidate.
///
/// Returns `Ok(None)` when the pose gate rejects the frame, `Ok(Some(score))`
/// otherwise. Load failures surface as skippable [`FramePickError::FrameDecode`].
fn score_candidate(
    reference: &image::DynamicImage,
    candidate: &StoredFrame,
    options: &PipelineOptions,
) -> Result<Option<f64>, FramePickError> {
    let image = image::open(&candidate.path)
        .map_err(|error| FramePickError::FrameDecode(error.to_string()))?;

    if !options.pose_gate.admits(&image) {
        log::debug!("Pose gate rejected frame {}", candidate.index);
        return Ok(None);
    }

    let score = quality::score(reference, &image)?;
    Ok(Some(score.combined))
}
