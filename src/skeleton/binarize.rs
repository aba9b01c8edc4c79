//! Adaptive binarization and denoising
//!
//! A local-mean adaptive threshold (window 21, constant 5), inverted so
//! ridges are foreground, then a 3x3 median filter to remove
//! salt-and-pepper noise before thinning.

use image::GrayImage;
use imageproc::filter::median_filter;

/// Local-mean box filter used as the adaptive threshold's neighborhood
/// average; a box mean over the window is a close enough approximation
/// of a Gaussian-weighted average for ridge/valley separation at this
/// resolution.
fn local_mean(gray: &GrayImage, window: u32) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as i32, height as i32);
    let r = (window as i32) / 2;
    let mut out = vec![0.0f32; (width * height) as usize];

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            let mut n = 0.0f32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let px = (x + dx).clamp(0, w - 1);
                    let py = (y + dy).clamp(0, h - 1);
                    sum += gray.get_pixel(px as u32, py as u32).0[0] as f32;
                    n += 1.0;
                }
            }
            out[(y * w + x) as usize] = sum / n;
        }
    }
    out
}

/// Binarize the enhanced ridge image: a pixel is foreground (255) when it
/// falls `constant` or more below its local neighborhood mean, so dark
/// ridges on a lighter background become foreground. Denoised with a 3x3
/// median filter.
pub fn binarize(gray: &GrayImage, window: u32, constant: f32, median_radius: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let means = local_mean(gray, window);

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let v = gray.get_pixel(x, y).0[0] as f32;
            let threshold = means[idx] - constant;
            let fg = v < threshold;
            out.put_pixel(x, y, image::Luma([if fg { 255 } else { 0 }]));
        }
    }

    median_filter(&out, median_radius, median_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn dark_ridge_on_light_background_is_foreground() {
        let mut img = GrayImage::from_pixel(40, 40, Luma([200]));
        for y in 18..22 {
            for x in 0..40 {
                img.put_pixel(x, y, Luma([40]));
            }
        }
        let bin = binarize(&img, 21, 5.0, 1);
        assert_eq!(bin.get_pixel(20, 20).0[0], 255);
        assert_eq!(bin.get_pixel(20, 2).0[0], 0);
    }

    #[test]
    fn flat_image_has_no_foreground() {
        let img = GrayImage::from_pixel(30, 30, Luma([128]));
        let bin = binarize(&img, 21, 5.0, 1);
        assert!(bin.pixels().all(|p| p.0[0] == 0));
    }
}
