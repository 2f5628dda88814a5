//! Quality scorer integration tests.
//!
//! All tests run on synthetic images — no media fixtures required.

use framepick::{FramePickError, quality};
use image::{DynamicImage, RgbImage};

/// A solid-colour RGB image.
fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb(rgb)))
}

/// A deterministic non-uniform RGB image.
fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 7 % 256) as u8,
            (y * 11 % 256) as u8,
            ((x + y) * 13 % 256) as u8,
        ])
    }))
}

#[test]
fn identical_images_score_perfectly() {
    let frame = gradient(32, 24);
    let score = quality::score(&frame, &frame).expect("scoring failed");

    assert_eq!(score.ssim, 1.0);
    assert_eq!(score.mse, 0.0);
    assert!(score.psnr.is_infinite() && score.psnr > 0.0);
    assert!(score.combined.is_infinite() && score.combined > 0.0);
}

#[test]
fn different_images_score_finitely() {
    let reference = gradient(32, 24);
    let candidate = solid(32, 24, [40, 90, 160]);
    let score = quality::score(&reference, &candidate).expect("scoring failed");

    assert!(score.ssim < 1.0);
    assert!(score.ssim >= -1.0);
    assert!(score.mse > 0.0);
    assert!(score.psnr.is_finite());
    assert!(score.combined.is_finite());
}

#[test]
fn combined_is_weighted_sum() {
    let reference = gradient(32, 24);
    let candidate = solid(32, 24, [128, 128, 128]);
    let score = quality::score(&reference, &candidate).expect("scoring failed");

    let expected = 0.5 * score.ssim + 0.3 * score.psnr;
    assert!(
        (score.combined - expected).abs() < 1e-12,
        "combined {} != 0.5*ssim + 0.3*psnr = {expected}",
        score.combined,
    );
}

#[test]
fn known_mse_value() {
    // Every sample differs by exactly 2 -> MSE is exactly 4.
    let reference = solid(16, 16, [100, 100, 100]);
    let candidate = solid(16, 16, [102, 102, 102]);
    let score = quality::score(&reference, &candidate).expect("scoring failed");

    assert_eq!(score.mse, 4.0);
    let expected_psnr = 10.0 * (255.0_f64 * 255.0 / 4.0).log10();
    assert!((score.psnr - expected_psnr).abs() < 1e-9);
}

#[test]
fn mismatched_dimensions_fail() {
    let reference = solid(32, 24, [0, 0, 0]);
    let candidate = solid(24, 32, [0, 0, 0]);

    match quality::score(&reference, &candidate) {
        Err(FramePickError::ShapeMismatch { expected, actual }) => {
            assert_eq!(expected, (32, 24, 3));
            assert_eq!(actual, (24, 32, 3));
        }
        other => panic!("Expected ShapeMismatch, got: {other:?}"),
    }
}

#[test]
fn mismatched_channels_fail() {
    let reference = solid(32, 24, [0, 0, 0]);
    let candidate = DynamicImage::ImageLuma8(image::GrayImage::new(32, 24));

    match quality::score(&reference, &candidate) {
        Err(FramePickError::ShapeMismatch { expected, actual }) => {
            assert_eq!(expected.2, 3);
            assert_eq!(actual.2, 1);
        }
        other => panic!("Expected ShapeMismatch, got: {other:?}"),
    }
}

#[test]
fn images_smaller_than_window_are_rejected() {
    let reference = solid(6, 6, [0, 0, 0]);
    let candidate = solid(6, 6, [0, 0, 0]);

    let result = quality::score(&reference, &candidate);
    assert!(matches!(result, Err(FramePickError::FrameDecode(_))));
}

#[test]
fn scoring_is_deterministic() {
    let reference = gradient(48, 32);
    let candidate = solid(48, 32, [7, 77, 177]);

    let first = quality::score(&reference, &candidate).expect("scoring failed");
    let second = quality::score(&reference, &candidate).expect("scoring failed");

    assert_eq!(first.ssim, second.ssim);
    assert_eq!(first.mse, second.mse);
    assert_eq!(first.psnr, second.psnr);
    assert_eq!(first.combined, second.combined);
}
