//! Error types for the `framepick` crate.
//!
//! This module defines [`FramePickError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context to
//! diagnose the problem — file paths, frame shapes, upstream messages —
//! without additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// Width, height and channel count of a raster frame.
///
/// Used by [`FramePickError::ShapeMismatch`] to report both sides of a
/// failed comparison.
pub type FrameShape = (u32, u32, u8);

/// The unified error type for all `framepick` operations.
///
/// Every public method that can fail returns `Result<T, FramePickError>`.
///
/// Two variants are *recoverable* inside a selection scan:
/// [`FrameDecode`](FramePickError::FrameDecode) and
/// [`ShapeMismatch`](FramePickError::ShapeMismatch) mark a single bad
/// candidate, which the scan skips and counts. Everything else aborts the
/// operation that produced it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramePickError {
    /// The video source could not be opened.
    #[error("Failed to open video at {path}: {reason}")]
    SourceUnavailable {
        /// Path that was passed to [`crate::FrameDecoder::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The reference frame is missing or unreadable; selection cannot start.
    #[error("Failed to load reference frame at {path}: {reason}")]
    ReferenceUnavailable {
        /// Path of the reference frame image.
        path: PathBuf,
        /// Underlying reason the load failed.
        reason: String,
    },

    /// A single frame could not be decoded.
    ///
    /// Fatal when produced by [`crate::FrameDecoder`]; recoverable (skip and
    /// count) when produced while loading a stored candidate during
    /// selection.
    #[error("Failed to decode frame: {0}")]
    FrameDecode(String),

    /// Reference and candidate frames do not share pixel dimensions and
    /// channel count.
    ///
    /// Frames are never silently resized to fit; inside a selection scan the
    /// mismatched candidate is skipped instead.
    #[error(
        "Frame shape mismatch: reference is {}x{}x{}, candidate is {}x{}x{}",
        .expected.0, .expected.1, .expected.2, .actual.0, .actual.1, .actual.2
    )]
    ShapeMismatch {
        /// Shape of the reference frame.
        expected: FrameShape,
        /// Shape of the offending candidate.
        actual: FrameShape,
    },

    /// A subsampling stride of zero was provided.
    #[error("Stride must be greater than zero")]
    InvalidStride,

    /// The operation was cancelled via a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame encode/decode.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

impl FramePickError {
    /// Whether a selection scan may absorb this error by skipping the
    /// offending candidate.
    pub(crate) fn is_skippable(&self) -> bool {
        matches!(
            self,
            FramePickError::FrameDecode(_) | FramePickError::ShapeMismatch { .. }
        )
    }
}

impl From<FfmpegError> for FramePickError {
    fn from(error: FfmpegError) -> Self {
        FramePickError::Ffmpeg(error.to_string())
    }
}
