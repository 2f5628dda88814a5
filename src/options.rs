//! Pipeline configuration.
//!
//! [`PipelineOptions`] is a builder that threads progress callbacks,
//! cancellation tokens, the reference-frame index, and the pose gate through
//! the extraction and selection entry points without polluting every function
//! signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framepick::{CancellationToken, PipelineOptions, ProgressCallback};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, processed: u64, total: u64) {
//!         println!("{processed}/{total} done");
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = PipelineOptions::new()
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone())
//!     .with_reference_index(5);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::pose::{AcceptAll, PoseGate};
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Configuration for pipeline runs.
///
/// Carries optional progress-, cancellation-, and selection-related settings.
/// Pass a reference to this struct to
/// [`extract_frames`](crate::extract_frames),
/// [`select_best_frame`](crate::select_best_frame), and
/// [`worker::spawn`](crate::worker::spawn).
///
/// All fields have defaults — a default-constructed value behaves like the
/// plain no-callback, reference-frame-0 pipeline.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// Index of the stored frame used as the reference. Defaults to 0
    /// (`frame_0.jpg`).
    pub(crate) reference_index: u64,
    /// Pose gate consulted per candidate. Defaults to [`AcceptAll`].
    pub(crate) pose_gate: Arc<dyn PoseGate>,
}

impl Debug for PipelineOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("reference_index", &self.reference_index)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOptions {
    /// Create a new configuration with default settings.
    ///
    /// Defaults: no progress callback, no cancellation, reference frame 0,
    /// accept-all pose gate.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            reference_index: 0,
            pose_gate: Arc::new(AcceptAll),
        }
    }

    /// Attach a progress callback.
    ///
    /// The callback is invoked after every decoded frame during extraction
    /// and after every candidate during selection.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, the pipeline stops between frames and
    /// returns [`FramePickError::Cancelled`](crate::FramePickError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Select which stored frame index serves as the reference.
    ///
    /// Defaults to 0, matching the `frame_0.jpg` convention. The frame must
    /// exist in the scanned directory or selection fails with
    /// [`ReferenceUnavailable`](crate::FramePickError::ReferenceUnavailable).
    #[must_use]
    pub fn with_reference_index(mut self, index: u64) -> Self {
        self.reference_index = index;
        self
    }

    /// Inject a pose gate consulted once per candidate during selection.
    ///
    /// Candidates the gate rejects are skipped (and counted) without being
    /// scored. The default [`AcceptAll`] gate admits every candidate.
    #[must_use]
    pub fn with_pose_gate(mut self, gate: Arc<dyn PoseGate>) -> Self {
        self.pose_gate = gate;
        self
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
