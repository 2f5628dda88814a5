//! Pose gating for frame selection.
//!
//! Selection can optionally be restricted to frames in which a human pose is
//! detectable. The detector itself is not part of this crate — pose models
//! are heavyweight, process-wide resources — so the seam is a trait:
//! construct the gate once, tear it down explicitly, and inject it through
//! [`PipelineOptions::with_pose_gate`](crate::PipelineOptions::with_pose_gate).
//! Tests substitute a stub.
//!
//! The default [`AcceptAll`] gate admits every candidate, which makes
//! selection behave exactly as if no pose model were loaded.

use image::DynamicImage;

/// Decides whether a candidate frame is eligible for scoring.
///
/// Implementations must be [`Send`] and [`Sync`]; the gate is consulted from
/// the worker thread, once per candidate, in index order.
pub trait PoseGate: Send + Sync {
    /// Returns `true` if the frame should be scored.
    ///
    /// Returning `false` causes the candidate to be skipped and counted like
    /// an unreadable frame; it never aborts the scan.
    fn admits(&self, frame: &DynamicImage) -> bool;
}

/// A gate that admits every frame.
///
/// This is the default; it preserves the behavior of running without any
/// pose model.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl PoseGate for AcceptAll {
    fn admits(&self, _frame: &DynamicImage) -> bool {
        true
    }
}
