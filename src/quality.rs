//! Image quality metrics.
//!
//! Compares two same-shaped images and produces a [`QualityScore`]: a
//! channel-aware structural similarity value (SSIM), a mean squared error
//! (MSE), the derived peak signal-to-noise ratio (PSNR), and the weighted
//! composite used to rank candidate frames.
//!
//! [`score`] is a pure, deterministic function of its two inputs — no hidden
//! state, no randomness.
//!
//! # Example
//!
//! ```no_run
//! use framepick::quality;
//!
//! let reference = image::open("frame_0.jpg")?;
//! let candidate = image::open("frame_10.jpg")?;
//! let score = quality::score(&reference, &candidate)?;
//! println!("ssim={:.4} psnr={:.2} combined={:.2}", score.ssim, score.psnr, score.combined);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use image::DynamicImage;

use crate::error::{FramePickError, FrameShape};

/// Sliding-window side length for SSIM.
const SSIM_WINDOW: usize = 7;

/// SSIM stabilisation constants, relative to the data range.
const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Dynamic range of 8-bit samples.
const DATA_RANGE: f64 = 255.0;

/// Relative weights of the composite score.
///
/// SSIM is bounded in [-1, 1] while PSNR is unbounded above, so the
/// composite is dominated by PSNR magnitude. The asymmetry is intentional
/// and load-bearing: rebalancing it would change which frame wins.
const SSIM_WEIGHT: f64 = 0.5;
const PSNR_WEIGHT: f64 = 0.3;

/// Quality of a candidate frame relative to a reference frame.
///
/// Produced by [`score`]; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct QualityScore {
    /// Structural similarity in [-1, 1]; 1 means structurally identical.
    pub ssim: f64,
    /// Mean squared per-sample error, ≥ 0.
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB; `+∞` for pixel-identical images.
    pub psnr: f64,
    /// Weighted composite: `0.5·ssim + 0.3·psnr`.
    ///
    /// `+∞` whenever `psnr` is — a pixel-identical candidate trivially wins.
    pub combined: f64,
}

/// Score a candidate image against a reference image.
///
/// Both images must share pixel dimensions and channel count; mismatches
/// fail with [`FramePickError::ShapeMismatch`] rather than resizing
/// silently. Samples are compared as 8-bit RGB (higher bit depths are
/// converted first).
///
/// SSIM is computed channel-aware: a uniform 7×7 sliding window per channel
/// with unbiased covariance, the per-channel means averaged together. PSNR
/// is derived from the MSE over all samples and defined as `+∞` when the MSE
/// is zero.
///
/// # Errors
///
/// - [`FramePickError::ShapeMismatch`] when dimensions or channel counts
///   differ.
/// - [`FramePickError::FrameDecode`] when either image is smaller than the
///   7×7 SSIM window.
pub fn score(
    reference: &DynamicImage,
    candidate: &DynamicImage,
) -> Result<QualityScore, FramePickError> {
    let expected = shape_of(reference);
    let actual = shape_of(candidate);
    if expected != actual {
        return Err(FramePickError::ShapeMismatch { expected, actual });
    }

    let (width, height) = (expected.0 as usize, expected.1 as usize);
    if width < SSIM_WINDOW || height < SSIM_WINDOW {
        return Err(FramePickError::FrameDecode(format!(
            "Image {width}x{height} is smaller than the {SSIM_WINDOW}x{SSIM_WINDOW} SSIM window"
        )));
    }

    let reference_rgb = reference.to_rgb8();
    let candidate_rgb = candidate.to_rgb8();
    let reference_samples = reference_rgb.as_raw();
    let candidate_samples = candidate_rgb.as_raw();

    let mse = mean_squared_error(reference_samples, candidate_samples);
    let psnr = if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (DATA_RANGE * DATA_RANGE / mse).log10()
    };

    // Channel-aware SSIM: one plane per channel, means averaged.
    let mut ssim_sum = 0.0;
    for channel in 0..3 {
        let reference_plane = extract_plane(reference_samples, channel, 3);
        let candidate_plane = extract_plane(candidate_samples, channel, 3);
        ssim_sum += ssim_plane(&reference_plane, &candidate_plane, width, height);
    }
    let ssim = ssim_sum / 3.0;

    Ok(QualityScore {
        ssim,
        mse,
        psnr,
        combined: SSIM_WEIGHT * ssim + PSNR_WEIGHT * psnr,
    })
}

/// Width, height and channel count of an image.
fn shape_of(image: &DynamicImage) -> FrameShape {
    (image.width(), image.height(), image.color().channel_count())
}

/// Mean squared error over all interleaved 8-bit samples.
fn mean_squared_error(a: &[u8], b: &[u8]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff = x as f64 - y as f64;
            diff * diff
        })
        .sum();
    sum / a.len() as f64
}

/// Deinterleave one channel of a packed sample buffer into an `f64` plane.
fn extract_plane(samples: &[u8], channel: usize, channels: usize) -> Vec<f64> {
    samples
        .iter()
        .skip(channel)
        .step_by(channels)
        .map(|&s| s as f64)
        .collect()
}

/// Mean SSIM of two single-channel planes.
///
/// Uniform 7×7 window, unbiased covariance, averaged over every full window
/// position. Identical planes yield exactly 1.0.
fn ssim_plane(x: &[f64], y: &[f64], width: usize, height: usize) -> f64 {
    let window_pixels = (SSIM_WINDOW * SSIM_WINDOW) as f64;
    let cov_norm = window_pixels / (window_pixels - 1.0);
    let c1 = (K1 * DATA_RANGE) * (K1 * DATA_RANGE);
    let c2 = (K2 * DATA_RANGE) * (K2 * DATA_RANGE);

    let mut total = 0.0;
    let mut windows = 0u64;

    for top in 0..=(height - SSIM_WINDOW) {
        for left in 0..=(width - SSIM_WINDOW) {
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            let mut sum_xx = 0.0;
            let mut sum_yy = 0.0;
            let mut sum_xy = 0.0;

            for row in top..top + SSIM_WINDOW {
                let offset = row * width + left;
                for (&px, &py) in x[offset..offset + SSIM_WINDOW]
                    .iter()
                    .zip(&y[offset..offset + SSIM_WINDOW])
                {
                    sum_x += px;
                    sum_y += py;
                    sum_xx += px * px;
                    sum_yy += py * py;
                    sum_xy += px * py;
                }
            }

            let mean_x = sum_x / window_pixels;
            let mean_y = sum_y / window_pixels;
            let var_x = cov_norm * (sum_xx / window_pixels - mean_x * mean_x);
            let var_y = cov_norm * (sum_yy / window_pixels - mean_y * mean_y);
            let cov_xy = cov_norm * (sum_xy / window_pixels - mean_x * mean_y);

            let luminance = 2.0 * mean_x * mean_y + c1;
            let contrast = 2.0 * cov_xy + c2;
            let denominator = (mean_x * mean_x + mean_y * mean_y + c1) * (var_x + var_y + c2);

            total += (luminance * contrast) / denominator;
            windows += 1;
        }
    }

    total / windows as f64
}

#[cfg(test)]
mod tests {
    use super::{extract_plane, mean_squared_error, ssim_plane};

    #[test]
    fn ssim_plane_identical_is_one() {
        let plane: Vec<f64> = (0..100).map(|i| (i % 251) as f64).collect();
        let value = ssim_plane(&plane, &plane, 10, 10);
        assert_eq!(value, 1.0);
    }

    #[test]
    fn ssim_plane_constant_vs_constant_differs() {
        let black = vec![0.0; 49];
        let white = vec![255.0; 49];
        let value = ssim_plane(&black, &white, 7, 7);
        assert!(value < 0.01, "dissimilar planes should score near zero, got {value}");
    }

    #[test]
    fn mse_counts_all_samples() {
        let a = [0u8, 0, 0, 0];
        let b = [2u8, 2, 0, 0];
        assert_eq!(mean_squared_error(&a, &b), 2.0);
    }

    #[test]
    fn extract_plane_deinterleaves() {
        let samples = [1u8, 2, 3, 4, 5, 6];
        assert_eq!(extract_plane(&samples, 0, 3), vec![1.0, 4.0]);
        assert_eq!(extract_plane(&samples, 2, 3), vec![3.0, 6.0]);
    }
}
