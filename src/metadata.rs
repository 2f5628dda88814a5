//! Video stream metadata.
//!
//! [`VideoMetadata`] is probed once when a [`FrameDecoder`](crate::FrameDecoder)
//! opens a file and cached for the lifetime of the decoder.

/// Metadata for the decoded video stream.
///
/// Includes dimensions, frame rate, estimated frame count, and codec name.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame
    /// rate. `0` when the container reports no usable duration.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
}
