//! Hong-style mean/variance normalization

use image::GrayImage;

/// Rescale `gray` so its mean/variance match `target_mean`/`target_variance`,
/// following Hong et al.: for each pixel `g`,
/// `out = target_mean +/- sqrt((g - mean)^2 * target_variance / variance)`,
/// sign chosen by whether `g >= mean`. Clipped to [0, 255].
pub fn normalize(gray: &GrayImage, target_mean: f32, target_variance: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let n = (width * height) as f64;

    let sum: f64 = gray.pixels().map(|p| p.0[0] as f64).sum();
    let mean = sum / n;

    let sum_sq_dev: f64 = gray
        .pixels()
        .map(|p| {
            let d = p.0[0] as f64 - mean;
            d * d
        })
        .sum();
    let variance = (sum_sq_dev / n).max(1e-6);

    let mean = mean as f32;
    let variance = variance as f32;

    let mut out = GrayImage::new(width, height);
    for (src, dst) in gray.pixels().zip(out.pixels_mut()) {
        let g = src.0[0] as f32;
        let dev = g - mean;
        let scaled = (dev * dev * target_variance / variance).sqrt();
        let value = if g >= mean {
            target_mean + scaled
        } else {
            target_mean - scaled
        };
        dst.0[0] = value.clamp(0.0, 255.0).round() as u8;
    }
    out
}
