//! Image enhancement: normalize, estimate orientation/coherence, derive a
//! region-of-interest mask, then apply block-wise Gabor filtering.
//!
//! The entry point validates input, logs each stage transition, runs the
//! stages in sequence, and assembles the output.

mod gabor;
mod normalize;
mod orientation;
mod roi;

pub use gabor::GaborBank;

use crate::config::EnhanceConfig;
use crate::error::{FingerprintError, Result};
use crate::types::{CoherenceMap, OrientationMap, SENSOR_HEIGHT, SENSOR_WIDTH};
use image::GrayImage;
use log::debug;

/// Output of the enhancement stage: the enhanced ridge image plus the
/// orientation/coherence fields and ROI mask it was derived from.
pub struct EnhanceOutput {
    pub enhanced: GrayImage,
    pub orientation: OrientationMap,
    pub coherence: CoherenceMap,
    pub roi_mask: GrayImage,
}

/// Run the full enhancement pipeline on a raw sensor capture.
///
/// Expects a `SENSOR_WIDTH` x `SENSOR_HEIGHT` grayscale image; any other
/// shape is rejected up front.
pub fn enhance(gray: &GrayImage, config: &EnhanceConfig) -> Result<EnhanceOutput> {
    let (width, height) = gray.dimensions();
    if width != SENSOR_WIDTH || height != SENSOR_HEIGHT {
        return Err(FingerprintError::InputShape { width, height });
    }

    debug!("normalizing capture to mean={} var={}", config.target_mean, config.target_variance);
    let normalized = normalize::normalize(gray, config.target_mean, config.target_variance);

    debug!("estimating orientation/coherence over {}px blocks", config.block_size);
    let (orientation, coherence) = orientation::compute_orientation_coherence(
        &normalized,
        config.block_size,
        config.orientation_smoothing_sigma,
    );

    debug!("deriving ROI mask (variance threshold {})", config.roi_variance_threshold);
    let roi_mask =
        roi::block_variance_mask(&normalized, config.block_size, config.roi_variance_threshold);

    debug!("building Gabor bank of {} orientations", config.gabor_orientations);
    let bank = GaborBank::build(
        config.gabor_orientations,
        config.gabor_kernel_size,
        config.gabor_sigma,
        config.gabor_lambda,
        config.gabor_gamma,
    );

    debug!("applying block-wise Gabor enhancement");
    let enhanced = gabor::gabor_enhance_blockwise(
        &normalized,
        &orientation,
        &coherence,
        &roi_mask,
        config.block_size,
        &bank,
        config.gabor_mask_gate,
        config.gabor_coherence_gate,
    );

    Ok(EnhanceOutput {
        enhanced,
        orientation,
        coherence,
        roi_mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn striped_capture() -> GrayImage {
        let mut img = GrayImage::new(SENSOR_WIDTH, SENSOR_HEIGHT);
        for y in 0..SENSOR_HEIGHT {
            for x in 0..SENSOR_WIDTH {
                let v = if (x / 4) % 2 == 0 { 60 } else { 200 };
                img.put_pixel(x, y, Luma([v]));
            }
        }
        img
    }

    #[test]
    fn rejects_wrong_shaped_input() {
        let img = GrayImage::new(100, 100);
        let err = enhance(&img, &EnhanceConfig::default()).unwrap_err();
        assert!(matches!(err, FingerprintError::InputShape { .. }));
    }

    #[test]
    fn non_roi_pixels_equal_normalized_input() {
        let img = striped_capture();
        let config = EnhanceConfig::default();
        let normalized = normalize::normalize(&img, config.target_mean, config.target_variance);
        let out = enhance(&img, &config).unwrap();
        for y in 0..SENSOR_HEIGHT {
            for x in 0..SENSOR_WIDTH {
                if out.roi_mask.get_pixel(x, y).0[0] == 0 {
                    assert_eq!(
                        out.enhanced.get_pixel(x, y).0[0],
                        normalized.get_pixel(x, y).0[0]
                    );
                }
            }
        }
    }

    #[test]
    fn produces_full_size_fields() {
        let img = striped_capture();
        let out = enhance(&img, &EnhanceConfig::default()).unwrap();
        assert_eq!(out.enhanced.dimensions(), (SENSOR_WIDTH, SENSOR_HEIGHT));
        assert_eq!(out.orientation.width, SENSOR_WIDTH);
        assert_eq!(out.coherence.height, SENSOR_HEIGHT);
    }
}
