//! Background pipeline runs.
//!
//! [`spawn`] executes the extract-then-select pipeline on a dedicated worker
//! thread and streams [`PipelineEvent`]s back over a channel. The invoking
//! surface (CLI event loop, GUI main thread) never blocks on the worker: it
//! drains the receiver at its own pace and reacts to exactly one terminal
//! event — [`Completed`](PipelineEvent::Completed),
//! [`Failed`](PipelineEvent::Failed), or
//! [`Cancelled`](PipelineEvent::Cancelled) — per run.
//!
//! Cancellation is cooperative: [`PipelineWorker::cancel`] trips the shared
//! token, and the worker observes it between frames.
//!
//! # Example
//!
//! ```no_run
//! use framepick::worker::{self, PipelineEvent};
//! use framepick::PipelineOptions;
//!
//! let worker = worker::spawn("input.mp4", "output", 10, PipelineOptions::new());
//! for event in worker.events() {
//!     match event {
//!         PipelineEvent::ExtractProgress { processed, total }
//!         | PipelineEvent::SelectProgress { processed, total } => {
//!             println!("{processed}/{total}");
//!         }
//!         PipelineEvent::Completed(result) => println!("{:?}", result.best_index),
//!         PipelineEvent::Failed(error) => eprintln!("{error}"),
//!         PipelineEvent::Cancelled => eprintln!("cancelled"),
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::{
    error::FramePickError,
    options::PipelineOptions,
    pipeline,
    progress::CancellationToken,
    selector::{self, SelectionResult},
};

/// Progress and outcome notifications emitted by a background run.
///
/// Progress events mirror the phase structure of the pipeline: extraction
/// first, then the selection scan. Exactly one of the three terminal events
/// closes the stream; the channel disconnects afterwards.
#[derive(Debug)]
pub enum PipelineEvent {
    /// A frame was decoded during extraction.
    ExtractProgress {
        /// Frames decoded so far, clamped to `total`.
        processed: u64,
        /// Frame-count estimate for the video.
        total: u64,
    },
    /// A candidate was visited (scored or skipped) during selection.
    SelectProgress {
        /// Candidates visited so far; increases by exactly 1 per event.
        processed: u64,
        /// Number of candidate frames in the directory.
        total: u64,
    },
    /// The run finished; the result is final and will not change.
    Completed(SelectionResult),
    /// The run aborted with a fatal error. Terminal — start a fresh run to
    /// retry.
    Failed(FramePickError),
    /// The run observed its cancellation token. Terminal, distinct from
    /// failure.
    Cancelled,
}

/// Handle to a background pipeline run.
///
/// Dropping the handle does not stop the run; call
/// [`cancel`](PipelineWorker::cancel) first if the work should not outlive
/// the handle.
pub struct PipelineWorker {
    events: Receiver<PipelineEvent>,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PipelineWorker {
    /// The event stream for this run.
    ///
    /// Iterating the receiver yields events until the terminal one, after
    /// which the channel disconnects.
    pub fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events
    }

    /// Request cooperative cancellation.
    ///
    /// The worker observes the request between frames and emits
    /// [`PipelineEvent::Cancelled`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Block until the worker thread has exited.
    ///
    /// The terminal event has always been sent by the time this returns.
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

/// Run the full pipeline on a background thread.
///
/// `options` is extended with channel-forwarding progress callbacks for each
/// phase; a caller-supplied callback in `options` is replaced (consume the
/// event stream instead). A caller-supplied cancellation token is honored
/// and additionally reachable through [`PipelineWorker::cancel`].
pub fn spawn<P, Q>(
    video_path: P,
    output_root: Q,
    stride: u64,
    options: PipelineOptions,
) -> PipelineWorker
where
    P: Into<PathBuf>,
    Q: Into<PathBuf>,
{
    let video_path = video_path.into();
    let output_root = output_root.into();
    let (sender, events) = unbounded();

    let token = options
        .cancellation
        .clone()
        .unwrap_or_default();
    let options = options.with_cancellation(token.clone());

    let handle = std::thread::spawn({
        let sender = sender.clone();
        move || {
            let outcome = run_on_worker(&video_path, &output_root, stride, options, &sender);
            let terminal = match outcome {
                Ok(result) => PipelineEvent::Completed(result),
                Err(FramePickError::Cancelled) => PipelineEvent::Cancelled,
                Err(error) => PipelineEvent::Failed(error),
            };
            // The receiver may already be gone; nothing useful to do then.
            let _ = sender.send(terminal);
        }
    });

    PipelineWorker {
        events,
        token,
        handle,
    }
}

fn run_on_worker(
    video_path: &PathBuf,
    output_root: &PathBuf,
    stride: u64,
    options: PipelineOptions,
    sender: &Sender<PipelineEvent>,
) -> Result<SelectionResult, FramePickError> {
    let extract_options = options.clone().with_progress(Arc::new({
        let sender = sender.clone();
        move |processed: u64, total: u64| {
            let _ = sender.send(PipelineEvent::ExtractProgress { processed, total });
        }
    }));
    let frame_dir = pipeline::extract_frames(video_path, output_root, stride, &extract_options)?;

    let select_options = options.with_progress(Arc::new({
        let sender = sender.clone();
        move |processed: u64, total: u64| {
            let _ = sender.send(PipelineEvent::SelectProgress { processed, total });
        }
    }));
    selector::select_best_frame(frame_dir, output_root, &select_options)
}
