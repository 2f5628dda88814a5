//! Lazy, pull-based video frame decoding.
//!
//! [`FrameDecoder`] opens a video file and implements [`Iterator`], decoding
//! frames on demand — each call to [`next()`](Iterator::next) reads and
//! decodes just enough packets to produce the next frame. The sequence is
//! finite, one-pass, and strictly ordered: frame `i` is always yielded before
//! frame `i + 1`, and re-reading requires reopening the file.
//!
//! All FFmpeg resources are released when the decoder is dropped, including
//! on early termination.
//!
//! # Example
//!
//! ```no_run
//! use framepick::FrameDecoder;
//!
//! let decoder = FrameDecoder::open("input.mp4")?;
//! for result in decoder {
//!     let frame = result?;
//!     println!("frame {} ({} bytes)", frame.index, frame.byte_size());
//! }
//! # Ok::<(), framepick::FramePickError>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{error::FramePickError, metadata::VideoMetadata};

/// A single decoded frame.
///
/// Immutable once created: an RGB8 raster buffer plus the frame's sequential
/// index within the video.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Zero-based position of this frame in decode order.
    pub index: u64,
    /// The decoded pixels, always RGB8.
    pub image: DynamicImage,
}

impl DecodedFrame {
    /// Size of the raw pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.image.as_bytes().len()
    }
}

/// A lazy iterator over the frames of a video file.
///
/// Created via [`FrameDecoder::open`]. Owns the demuxer, decoder, and scaler
/// contexts exclusively for the duration of decoding; dropping the decoder
/// releases them unconditionally.
pub struct FrameDecoder {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    metadata: VideoMetadata,
    /// Sequential counter for the next frame to yield.
    next_index: u64,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
    #[allow(dead_code)]
    file_path: PathBuf,
}

impl FrameDecoder {
    /// Open a video file for frame-by-frame decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and probes its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FramePickError::SourceUnavailable`] if the file cannot be
    /// opened or decoded, and [`FramePickError::NoVideoStream`] if it
    /// contains no video stream. In both cases no frames are ever produced.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramePickError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video: {}", file_path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| FramePickError::SourceUnavailable {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FramePickError::SourceUnavailable {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or(FramePickError::NoVideoStream)?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let stream = input_context
            .stream(video_stream_index)
            .ok_or(FramePickError::NoVideoStream)?;
        let codec_parameters = stream.parameters();
        let decoder_context = CodecContext::from_parameters(codec_parameters).map_err(|error| {
            FramePickError::SourceUnavailable {
                path: file_path.clone(),
                reason: format!("Failed to read video codec parameters: {error}"),
            }
        })?;
        let decoder = decoder_context.decoder().video().map_err(|error| {
            FramePickError::SourceUnavailable {
                path: file_path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            }
        })?;

        let width = decoder.width();
        let height = decoder.height();

        // Compute frames per second from the stream's average frame rate.
        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            // Fallback: try the stream's rate field.
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let frame_count = if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };

        let codec_name = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            codec: codec_name,
        };

        // Convert every decoded frame to tightly-packed RGB24 at source size.
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| FramePickError::SourceUnavailable {
            path: file_path.clone(),
            reason: format!("Failed to create pixel-format converter: {error}"),
        })?;

        log::info!(
            "Opened video: {} ({}x{}, {:.2} fps, ~{} frames, codec={})",
            file_path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            metadata,
            next_index: 0,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
            file_path,
        })
    }

    /// Metadata of the video stream being decoded.
    ///
    /// Probed once during [`open`](FrameDecoder::open); does not require
    /// additional decoding.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Convert the current `decoded_frame` to a [`DynamicImage`].
    fn convert_current_frame(&mut self) -> Result<DynamicImage, FramePickError> {
        self.scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;

        let width = self.metadata.width;
        let height = self.metadata.height;
        let buffer = frame_to_rgb_buffer(&self.scaled_frame, width, height);
        let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FramePickError::FrameDecode(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(rgb_image))
    }
}

impl Iterator for FrameDecoder {
    type Item = Result<DecodedFrame, FramePickError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Try to receive a frame the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                match self.convert_current_frame() {
                    Ok(image) => {
                        let index = self.next_index;
                        self.next_index += 1;
                        return Some(Ok(DecodedFrame { index, image }));
                    }
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
            }

            // Decoder has no buffered frames. Feed it more packets.
            if self.eof_sent {
                // Already sent EOF and decoder is drained.
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        if let Err(e) = self.decoder.send_packet(&packet) {
                            self.done = true;
                            return Some(Err(FramePickError::from(e)));
                        }
                    }
                    // Non-video packets are silently skipped.
                }
                Err(FfmpegError::Eof) => {
                    if let Err(e) = self.decoder.send_eof() {
                        self.done = true;
                        return Some(Err(FramePickError::from(e)));
                    }
                    self.eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error — try the next packet.
                }
            }
        }
    }
}

/// Copy pixel data from an FFmpeg video frame into a tightly-packed RGB
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3). This
/// strips that padding so the result can be passed directly to
/// [`image::RgbImage::from_raw`].
fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        // No padding — fast path: copy the entire plane at once.
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        // Stride includes padding bytes — copy row by row.
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}
