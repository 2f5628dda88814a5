//! Pipeline entry points.
//!
//! [`extract_frames`] decodes a video and persists a stride-subsampled set
//! of frames; [`select_best_frame`](crate::select_best_frame) then scans the
//! stored set for the frame most similar to the reference. [`run`] chains
//! the two. These are the functions an invoking surface (CLI, GUI, another
//! service) calls — everything here executes synchronously on the calling
//! thread; see [`crate::worker`] for the background form.
//!
//! # Example
//!
//! ```no_run
//! use framepick::{FramePickError, PipelineOptions};
//!
//! let options = PipelineOptions::new();
//! let result = framepick::run("input.mp4", "output", 10, &options)?;
//! match result.best_frame_path {
//!     Some(path) => println!("best frame: {}", path.display()),
//!     None => println!("no best frame"),
//! }
//! # Ok::<(), FramePickError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::{
    decoder::FrameDecoder,
    error::FramePickError,
    options::PipelineOptions,
    selector::{self, SelectionResult},
    store::{self, FrameStore},
};

/// Decode `video_path` and store every `stride`-th frame under
/// `{output_root}/{video_basename}_extractedimages/`.
///
/// A frame with index `i` is persisted only when `i % stride == 0`; all
/// other frames are discarded immediately after decode, never buffered. The
/// configured progress callback fires after every decoded frame (stored or
/// not) with the decoder's frame-count estimate as the total, clamped so
/// `processed` never exceeds it.
///
/// Returns the frame directory, for feeding into
/// [`select_best_frame`](crate::select_best_frame).
///
/// # Errors
///
/// - [`FramePickError::InvalidStride`] when `stride` is 0.
/// - [`FramePickError::SourceUnavailable`] / [`FramePickError::NoVideoStream`]
///   when the video cannot be opened; no frame files are written.
/// - [`FramePickError::Cancelled`] if the options' token is cancelled
///   between frames.
/// - Decode and I/O errors from the frame stream and the store.
pub fn extract_frames<P: AsRef<Path>, Q: AsRef<Path>>(
    video_path: P,
    output_root: Q,
    stride: u64,
    options: &PipelineOptions,
) -> Result<PathBuf, FramePickError> {
    if stride == 0 {
        return Err(FramePickError::InvalidStride);
    }

    let video_path = video_path.as_ref();
    let decoder = FrameDecoder::open(video_path)?;
    let total = decoder.metadata().frame_count;

    let frame_dir = store::frame_dir_for(video_path, output_root);
    let frame_store = FrameStore::create(&frame_dir)?;

    log::debug!(
        "Extracting every {stride} frame(s) of {} into {}",
        video_path.display(),
        frame_dir.display(),
    );

    let mut decoded = 0u64;
    let mut stored = 0u64;

    for frame in decoder {
        if options.is_cancelled() {
            return Err(FramePickError::Cancelled);
        }

        let frame = frame?;
        if frame.index % stride == 0 {
            frame_store.save(&frame)?;
            stored += 1;
        }

        decoded += 1;
        // Duration-based frame counts are estimates and can undercount, so
        // clamp the reported position to the advertised total.
        if total > 0 {
            options.progress.on_progress(decoded.min(total), total);
        } else {
            options.progress.on_progress(decoded, decoded);
        }
    }

    log::info!(
        "Extraction complete: {stored} of {decoded} frame(s) stored in {}",
        frame_dir.display(),
    );

    Ok(frame_dir)
}

/// Extract frames from a video, then select the best one.
///
/// Equivalent to [`extract_frames`] followed by
/// [`select_best_frame`](crate::select_best_frame) on the produced
/// directory, with the same options threaded through both phases.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    video_path: P,
    output_root: Q,
    stride: u64,
    options: &PipelineOptions,
) -> Result<SelectionResult, FramePickError> {
    let output_root = output_root.as_ref();
    let frame_dir = extract_frames(video_path, output_root, stride, options)?;
    selector::select_best_frame(frame_dir, output_root, options)
}
