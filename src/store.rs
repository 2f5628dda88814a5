//! On-disk frame storage.
//!
//! [`FrameStore`] persists decoded frames as JPEG files whose names encode
//! the original frame index (`frame_{index}.jpg`). Encoding the index in the
//! filename is a correctness requirement, not cosmetics: directory listings
//! come back in arbitrary order, and a later selection pass must recover the
//! decode ordering from the stored names alone.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{decoder::DecodedFrame, error::FramePickError};

/// File stem prefix for stored frames.
const FRAME_PREFIX: &str = "frame_";

/// File extension for stored frames.
const FRAME_EXTENSION: &str = "jpg";

/// A stored frame rediscovered from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFrame {
    /// The original decode index, parsed from the filename.
    pub index: u64,
    /// Full path of the image file.
    pub path: PathBuf,
}

/// Persists frames to a directory, addressable by index.
///
/// Created via [`FrameStore::create`], which makes the destination directory
/// if absent (idempotent).
#[derive(Debug, Clone)]
pub struct FrameStore {
    directory: PathBuf,
}

impl FrameStore {
    /// Open a store rooted at `directory`, creating the directory if needed.
    ///
    /// Creating an already-existing directory is not an error.
    pub fn create<P: AsRef<Path>>(directory: P) -> Result<Self, FramePickError> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    /// The directory this store writes into.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path a frame with the given index is (or would be) stored at.
    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.directory
            .join(format!("{FRAME_PREFIX}{index}.{FRAME_EXTENSION}"))
    }

    /// Write a frame to the store as `frame_{index}.jpg`.
    ///
    /// Returns the path of the written file.
    pub fn save(&self, frame: &DecodedFrame) -> Result<PathBuf, FramePickError> {
        let path = self.frame_path(frame.index);
        frame.image.save(&path)?;
        Ok(path)
    }

    /// List the stored frames in ascending index order.
    ///
    /// Non-frame files (anything not matching `frame_{N}.jpg`) are ignored.
    /// The result is sorted numerically by the parsed index, never by the
    /// raw directory order.
    pub fn stored_frames(&self) -> Result<Vec<StoredFrame>, FramePickError> {
        list_frames(&self.directory)
    }
}

/// Derive the frame directory for a video: `{output_root}/{basename}_extractedimages`.
///
/// The basename is the video filename without its extension.
pub fn frame_dir_for<P: AsRef<Path>, Q: AsRef<Path>>(video_path: P, output_root: Q) -> PathBuf {
    let stem = video_path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    output_root.as_ref().join(format!("{stem}_extractedimages"))
}

/// List the frame files of a directory in ascending index order.
///
/// Standalone form of [`FrameStore::stored_frames`] for callers that only
/// have a directory path (e.g. selection over a directory produced by an
/// earlier run).
pub fn list_frames<P: AsRef<Path>>(directory: P) -> Result<Vec<StoredFrame>, FramePickError> {
    let mut frames = Vec::new();

    for entry in fs::read_dir(directory.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(index) = parse_frame_index(name) {
            frames.push(StoredFrame { index, path });
        }
    }

    frames.sort_by_key(|frame| frame.index);
    Ok(frames)
}

/// Parse the index out of a `frame_{N}.jpg` filename.
///
/// Returns `None` for anything that does not match the naming convention.
fn parse_frame_index(file_name: &str) -> Option<u64> {
    let stem = file_name.strip_suffix(&format!(".{FRAME_EXTENSION}"))?;
    let digits = stem.strip_prefix(FRAME_PREFIX)?;
    digits.parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::{frame_dir_for, parse_frame_index};

    #[test]
    fn parse_frame_index_accepts_convention() {
        assert_eq!(parse_frame_index("frame_0.jpg"), Some(0));
        assert_eq!(parse_frame_index("frame_120.jpg"), Some(120));
    }

    #[test]
    fn parse_frame_index_rejects_other_files() {
        assert_eq!(parse_frame_index("frame_.jpg"), None);
        assert_eq!(parse_frame_index("frame_12.png"), None);
        assert_eq!(parse_frame_index("thumb_12.jpg"), None);
        assert_eq!(parse_frame_index("frame_12a.jpg"), None);
        assert_eq!(parse_frame_index(".DS_Store"), None);
    }

    #[test]
    fn frame_dir_uses_video_basename() {
        let dir = frame_dir_for("/videos/ctf.mp4", "/out");
        assert_eq!(dir, std::path::PathBuf::from("/out/ctf_extractedimages"));
    }
}
