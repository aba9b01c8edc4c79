//! Binarization, thinning, and spur pruning

mod binarize;
mod prune;
mod thinning;

use crate::config::SkeletonConfig;
use image::GrayImage;
use log::debug;

/// Output of the skeleton stage: the pruned 1-pixel-wide skeleton plus the
/// intermediate binary image (useful for diagnostics).
pub struct SkeletonOutput {
    pub skeleton: GrayImage,
    pub binary: GrayImage,
}

/// Binarize an enhanced ridge image, thin it to a 1-pixel skeleton, and
/// prune spurs and isolated fragments.
pub fn binarize_and_thin(enhanced: &GrayImage, config: &SkeletonConfig) -> SkeletonOutput {
    debug!(
        "adaptive binarization (window={} constant={})",
        config.adaptive_window, config.adaptive_constant
    );
    let binary = binarize::binarize(
        enhanced,
        config.adaptive_window,
        config.adaptive_constant,
        config.median_radius,
    );

    debug!("Guo-Hall thinning");
    let thinned = thinning::guo_hall_thinning(&binary);

    debug!(
        "pruning spurs ({} iterations, min component {}px)",
        config.spur_prune_iterations, config.min_component_size
    );
    let skeleton = prune::prune(&thinned, config.spur_prune_iterations, config.min_component_size);

    SkeletonOutput { skeleton, binary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn pipeline_yields_thin_ridges_from_striped_input() {
        let mut img = GrayImage::new(60, 60);
        for y in 0..60 {
            for x in 0..60 {
                let v = if (x / 6) % 2 == 0 { 60 } else { 200 };
                img.put_pixel(x, y, Luma([v]));
            }
        }
        let out = binarize_and_thin(&img, &SkeletonConfig::default());
        assert_eq!(out.skeleton.dimensions(), (60, 60));
        assert!(out.skeleton.pixels().any(|p| p.0[0] > 0));
    }

    /// A 1-pixel-wide skeleton never contains a solid 2x2 block of ridge
    /// pixels. Exercised on a thick diagonal ridge run through the full
    /// binarize/thin/prune pipeline.
    #[test]
    fn skeleton_has_no_2x2_ridge_block() {
        let mut img = GrayImage::new(70, 70);
        for y in 0..70 {
            for x in 0..70 {
                let band = (x as i32 - y as i32).abs() < 5;
                img.put_pixel(x, y, Luma([if band { 40 } else { 210 }]));
            }
        }
        let out = binarize_and_thin(&img, &SkeletonConfig::default());
        for y in 0..69 {
            for x in 0..69 {
                let block_solid = (0..2)
                    .all(|dy| (0..2).all(|dx| out.skeleton.get_pixel(x + dx, y + dy).0[0] > 0));
                assert!(!block_solid, "solid 2x2 ridge block at ({x}, {y})");
            }
        }
    }
}
