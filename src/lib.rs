//! # framepick
//!
//! Pick the frame of a video most visually similar to a reference frame.
//!
//! `framepick` decodes a video into still frames with FFmpeg (via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate), stores a
//! stride-subsampled set of them as JPEGs, scores every stored frame against
//! a reference frame with a composite SSIM/PSNR metric, and reports the
//! winner.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framepick::PipelineOptions;
//!
//! let options = PipelineOptions::new();
//! let result = framepick::run("input.mp4", "output", 10, &options).unwrap();
//! if let Some(path) = result.best_frame_path {
//!     println!("Best frame: {}", path.display());
//! }
//! ```
//!
//! ### Two-phase form
//!
//! ```no_run
//! use framepick::{FramePickError, PipelineOptions};
//!
//! let options = PipelineOptions::new();
//!
//! // Phase 1: decode and store every 10th frame.
//! let frame_dir = framepick::extract_frames("input.mp4", "output", 10, &options)?;
//!
//! // Phase 2: score the stored frames against frame_0.jpg.
//! let result = framepick::select_best_frame(&frame_dir, "output", &options)?;
//! println!("Best index: {:?}", result.best_index);
//! # Ok::<(), FramePickError>(())
//! ```
//!
//! ### Background runs
//!
//! ```no_run
//! use framepick::worker::{self, PipelineEvent};
//! use framepick::PipelineOptions;
//!
//! let run = worker::spawn("input.mp4", "output", 10, PipelineOptions::new());
//! for event in run.events() {
//!     if let PipelineEvent::Completed(result) = event {
//!         println!("{:?}", result.best_index);
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **Lazy decoding** — [`FrameDecoder`] is a pull-based iterator; frames
//!   are decoded one at a time and never buffered as a set
//! - **Stride subsampling** — store every Nth frame as
//!   `frame_{index}.jpg`, recoverable in index order from the filenames alone
//! - **Composite scoring** — channel-aware SSIM, MSE, and PSNR combined into
//!   one scalar; pixel-identical candidates win outright
//! - **Deterministic selection** — strict greater-than replacement, so the
//!   first-seen candidate wins ties and re-runs agree
//! - **Progress & cancellation** — per-frame callbacks and a cooperative
//!   [`CancellationToken`]
//! - **Background worker** — a channel of [`worker::PipelineEvent`]s for
//!   surfaces that must never block
//! - **Pose gating** — an injectable [`PoseGate`] restricts selection to
//!   frames a detector admits; the default admits everything
//!
//! ## Output layout
//!
//! - Subsampled frames: `{output_root}/{video_basename}_extractedimages/frame_{index}.jpg`
//! - Winning frame: `{output_root}/best_frame_with_pose/{original_filename}`
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod decoder;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod options;
pub mod pipeline;
pub mod pose;
pub mod progress;
pub mod quality;
pub mod selector;
pub mod store;
pub mod worker;

pub use decoder::{DecodedFrame, FrameDecoder};
pub use error::{FramePickError, FrameShape};
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use options::PipelineOptions;
pub use pipeline::{extract_frames, run};
pub use pose::{AcceptAll, PoseGate};
pub use progress::{CancellationToken, ProgressCallback};
pub use quality::QualityScore;
pub use selector::{SelectionResult, select_best_frame};
pub use store::{FrameStore, StoredFrame, frame_dir_for, list_frames};
pub use worker::{PipelineEvent, PipelineWorker};
