//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring extraction and
//! selection progress, and [`CancellationToken`] for cooperative
//! cancellation.
//!
//! Both the extraction and the selection phase report progress as a pair of
//! counters: `processed` is incremented by exactly 1 per unit of work (one
//! decoded frame, one scored candidate — skipped candidates included) and
//! reaches `total` exactly once per phase.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framepick::{FramePickError, PipelineOptions, ProgressCallback};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, processed: u64, total: u64) {
//!         println!("{processed}/{total}");
//!     }
//! }
//!
//! let options = PipelineOptions::new().with_progress(Arc::new(PrintProgress));
//! let frame_dir = framepick::extract_frames("input.mp4", "output", 10, &options)?;
//! # Ok::<(), FramePickError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Trait for receiving progress updates during extraction and selection.
///
/// Implementations must be [`Send`] and [`Sync`] because callbacks are
/// invoked from the worker thread when a run is spawned in the background.
///
/// Progress callbacks are **infallible** — they observe but cannot halt the
/// operation. Use [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called after every unit of work with the number of units processed so
    /// far and the total expected.
    fn on_progress(&self, processed: u64, total: u64);
}

/// A no-op implementation that discards all progress notifications.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _processed: u64, _total: u64) {}
}

/// Blanket implementation so plain closures can be used as callbacks.
impl<F> ProgressCallback for F
where
    F: Fn(u64, u64) + Send + Sync,
{
    fn on_progress(&self, processed: u64, total: u64) {
        self(processed, total);
    }
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to request
/// cancellation of the associated run. The pipeline checks
/// [`is_cancelled`](CancellationToken::is_cancelled) between frames — the
/// natural suspension point — and aborts with
/// [`FramePickError::Cancelled`](crate::FramePickError::Cancelled).
///
/// # Example
///
/// ```
/// use framepick::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// // From another thread (or a signal handler, etc.):
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
