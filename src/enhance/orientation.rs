//! Structure-tensor orientation and coherence estimation
//!
//! Sobel gradients feed a per-pixel structure tensor, box-filtered over
//! 16x16 blocks and eigen-decomposed (via `nalgebra`'s `SymmetricEigen`)
//! to recover a dominant orientation and a coherence score from the
//! eigenvalue gap.

use crate::types::{CoherenceMap, OrientationMap};
use image::GrayImage;
use nalgebra::{Matrix2, SymmetricEigen};
use std::f32::consts::PI;

const SOBEL_X: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];
const SOBEL_Y: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];

fn sobel_gradients(gray01: &[f32], width: u32, height: u32) -> (Vec<f32>, Vec<f32>) {
    let (w, h) = (width as i32, height as i32);
    let mut gx = vec![0.0f32; gray01.len()];
    let mut gy = vec![0.0f32; gray01.len()];

    for y in 0..h {
        for x in 0..w {
            let mut sx = 0.0;
            let mut sy = 0.0;
            for ky in 0..3 {
                for kx in 0..3 {
                    let px = (x + kx - 1).clamp(0, w - 1);
                    let py = (y + ky - 1).clamp(0, h - 1);
                    let v = gray01[(py * w + px) as usize];
                    let k = (ky * 3 + kx) as usize;
                    sx += v * SOBEL_X[k] as f32;
                    sy += v * SOBEL_Y[k] as f32;
                }
            }
            let idx = (y * w + x) as usize;
            gx[idx] = sx;
            gy[idx] = sy;
        }
    }
    (gx, gy)
}

/// Box-filter accumulation of a per-pixel field over `block`x`block`
/// windows, replicating border pixels.
fn box_filter(field: &[f32], width: u32, height: u32, block: u32) -> Vec<f32> {
    let (w, h) = (width as i32, height as i32);
    let r = (block as i32) / 2;
    let mut out = vec![0.0f32; field.len()];
    let count = (block * block) as f32;

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0f32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let px = (x + dx).clamp(0, w - 1);
                    let py = (y + dy).clamp(0, h - 1);
                    sum += field[(py * w + px) as usize];
                }
            }
            out[(y * w + x) as usize] = sum / count;
        }
    }
    out
}

fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    let radius = (2.0 * sigma).round().max(1.0) as i32;
    let size = (2 * radius + 1).max(3) as usize;
    let radius = (size as i32 - 1) / 2;
    let mut kernel = vec![0.0f32; size];
    let mut sum = 0.0;
    for (i, k) in kernel.iter_mut().enumerate() {
        let d = (i as i32 - radius) as f32;
        *k = (-0.5 * d * d / (sigma * sigma)).exp();
        sum += *k;
    }
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with edge-clamped borders.
fn gaussian_blur(field: &[f32], width: u32, height: u32, sigma: f32) -> Vec<f32> {
    let kernel = gaussian_kernel_1d(sigma);
    let radius = (kernel.len() as i32 - 1) / 2;
    let (w, h) = (width as i32, height as i32);

    let mut horiz = vec![0.0f32; field.len()];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for (j, &wgt) in kernel.iter().enumerate() {
                let px = (x + j as i32 - radius).clamp(0, w - 1);
                sum += field[(y * w + px) as usize] * wgt;
            }
            horiz[(y * w + x) as usize] = sum;
        }
    }

    let mut vert = vec![0.0f32; field.len()];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for (j, &wgt) in kernel.iter().enumerate() {
                let py = (y + j as i32 - radius).clamp(0, h - 1);
                sum += horiz[(py * w + x) as usize] * wgt;
            }
            vert[(y * w + x) as usize] = sum;
        }
    }
    vert
}

/// Compute the (orientation, coherence) maps for a normalized grayscale
/// image via a block-accumulated structure tensor.
pub fn compute_orientation_coherence(
    gray: &GrayImage,
    block_size: u32,
    smoothing_sigma: f32,
) -> (OrientationMap, CoherenceMap) {
    let (width, height) = gray.dimensions();
    let gray01: Vec<f32> = gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect();

    let (gx, gy) = sobel_gradients(&gray01, width, height);

    let gxx: Vec<f32> = gx.iter().map(|&v| v * v).collect();
    let gyy: Vec<f32> = gy.iter().map(|&v| v * v).collect();
    let gxy: Vec<f32> = gx.iter().zip(gy.iter()).map(|(&a, &b)| a * b).collect();

    let jxx = box_filter(&gxx, width, height, block_size);
    let jyy = box_filter(&gyy, width, height, block_size);
    let jxy = box_filter(&gxy, width, height, block_size);

    let n = (width * height) as usize;
    let mut cos2 = vec![0.0f32; n];
    let mut sin2 = vec![0.0f32; n];
    let mut coherence_raw = vec![0.0f32; n];

    for i in 0..n {
        let tensor = Matrix2::new(jxx[i], jxy[i], jxy[i], jyy[i]);
        let eig = SymmetricEigen::new(tensor);
        let (lambda1, lambda2) = if eig.eigenvalues[0] >= eig.eigenvalues[1] {
            (eig.eigenvalues[0], eig.eigenvalues[1])
        } else {
            (eig.eigenvalues[1], eig.eigenvalues[0])
        };

        let theta = 0.5 * (2.0 * jxy[i]).atan2(jxx[i] - jyy[i]);
        cos2[i] = (2.0 * theta).cos();
        sin2[i] = (2.0 * theta).sin();
        coherence_raw[i] = ((lambda1 - lambda2) / (lambda1 + lambda2 + 1e-6)).clamp(0.0, 1.0);
    }

    let cos2_smooth = gaussian_blur(&cos2, width, height, smoothing_sigma);
    let sin2_smooth = gaussian_blur(&sin2, width, height, smoothing_sigma);
    let coherence_smooth = gaussian_blur(&coherence_raw, width, height, smoothing_sigma);

    let mut orientation = OrientationMap::new(width, height, 0.0);
    let mut coherence = CoherenceMap::new(width, height, 0.0);
    for i in 0..n {
        let theta = 0.5 * sin2_smooth[i].atan2(cos2_smooth[i]);
        // confine to [-pi/2, pi/2)
        let theta = wrap_half_pi(theta);
        let x = (i as u32) % width;
        let y = (i as u32) / width;
        orientation.set(x, y, theta);
        coherence.set(x, y, coherence_smooth[i].clamp(0.0, 1.0));
    }

    (orientation, coherence)
}

fn wrap_half_pi(theta: f32) -> f32 {
    let mut t = theta;
    while t < -PI / 2.0 {
        t += PI;
    }
    while t >= PI / 2.0 {
        t -= PI;
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn orientation_confined_to_half_pi_range() {
        let mut img = GrayImage::new(40, 40);
        for y in 0..40 {
            for x in 0..40 {
                let v = if x % 4 < 2 { 0 } else { 255 };
                img.put_pixel(x, y, Luma([v]));
            }
        }
        let (orient, coh) = compute_orientation_coherence(&img, 16, 3.0);
        for &v in &orient.data {
            assert!((-PI / 2.0..PI / 2.0).contains(&v));
        }
        for &v in &coh.data {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn vertical_stripes_yield_vertical_orientation() {
        let mut img = GrayImage::new(64, 64);
        for y in 0..64 {
            for x in 0..64 {
                let v = if x % 8 < 4 { 0 } else { 255 };
                img.put_pixel(x, y, Luma([v]));
            }
        }
        let (orient, _coh) = compute_orientation_coherence(&img, 16, 3.0);
        // ridges run vertically -> orientation near 0 (or +/- pi/2, unoriented)
        let center = orient.get(32, 32);
        assert!(center.abs() < 0.3 || (PI / 2.0 - center.abs()) < 0.3);
    }
}
