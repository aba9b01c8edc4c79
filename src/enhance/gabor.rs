//! Gabor filter bank and block-wise enhancement
//!
//! Precomputing a bank of discretized-angle kernels converts a per-pixel
//! Gabor cost into a per-block lookup: quantize each block's mean
//! orientation to the nearest bank entry instead of building a fresh
//! kernel for every pixel's exact angle.

use crate::types::{CoherenceMap, OrientationMap};
use image::GrayImage;
use std::f32::consts::PI;

/// A single real Gabor kernel, square with odd side length.
struct GaborKernel {
    side: u32,
    weights: Vec<f32>,
}

impl GaborKernel {
    fn new(side: u32, sigma: f32, theta: f32, lambda: f32, gamma: f32) -> Self {
        let r = (side / 2) as i32;
        let mut weights = vec![0.0f32; (side * side) as usize];
        let (sin_t, cos_t) = theta.sin_cos();

        for y in -r..=r {
            for x in -r..=r {
                let x_theta = x as f32 * cos_t + y as f32 * sin_t;
                let y_theta = -(x as f32) * sin_t + y as f32 * cos_t;
                let envelope =
                    (-0.5 * (x_theta * x_theta + gamma * gamma * y_theta * y_theta)
                        / (sigma * sigma))
                        .exp();
                let carrier = (2.0 * PI * x_theta / lambda).cos();
                let idx = ((y + r) * side as i32 + (x + r)) as usize;
                weights[idx] = envelope * carrier;
            }
        }
        Self { side, weights }
    }

    fn get(&self, dx: i32, dy: i32) -> f32 {
        let r = (self.side / 2) as i32;
        let idx = ((dy + r) * self.side as i32 + (dx + r)) as usize;
        self.weights[idx]
    }
}

/// A bank of `count` real Gabor kernels at angles `i * pi / count`.
pub struct GaborBank {
    kernels: Vec<GaborKernel>,
}

impl GaborBank {
    pub fn build(count: usize, side: u32, sigma: f32, lambda: f32, gamma: f32) -> Self {
        let kernels = (0..count)
            .map(|i| {
                let theta = PI * i as f32 / count as f32;
                GaborKernel::new(side, sigma, theta, lambda, gamma)
            })
            .collect();
        Self { kernels }
    }
}

/// Wrap an angle (radians) into [0, pi).
fn wrap_pi(theta: f32) -> f32 {
    let mut t = theta % PI;
    if t < 0.0 {
        t += PI;
    }
    t
}

/// Apply the Gabor bank block-wise: for each block whose ROI-mask mean and
/// coherence mean clear the configured gates, quantize the block's mean
/// orientation to the nearest bank index and convolve the block with that
/// kernel. Non-qualifying blocks are left untouched (copied from `base`).
/// The result is normalized to [0, 255], masked off outside the ROI, and
/// closed with a 3x3 ellipse.
#[allow(clippy::too_many_arguments)]
pub fn gabor_enhance_blockwise(
    base: &GrayImage,
    orientation: &OrientationMap,
    coherence: &CoherenceMap,
    mask: &GrayImage,
    block: u32,
    bank: &GaborBank,
    mask_gate: f32,
    coherence_gate: f32,
) -> GrayImage {
    let (width, height) = base.dimensions();
    let mut raw = vec![0.0f32; (width * height) as usize];
    let mut filtered_flag = vec![false; (width * height) as usize];

    let angle_step = PI / bank.kernels.len() as f32;

    let mut y = 0;
    while y < height {
        let ye = (y + block).min(height);
        let mut x = 0;
        while x < width {
            let xe = (x + block).min(width);

            let mut mask_sum = 0f64;
            let mut coh_sum = 0f64;
            let mut theta_sin = 0f64;
            let mut theta_cos = 0f64;
            let mut n = 0f64;
            for py in y..ye {
                for px in x..xe {
                    mask_sum += mask.get_pixel(px, py).0[0] as f64;
                    let c = coherence.get(px, py) as f64;
                    coh_sum += c;
                    let theta = orientation.get(px, py) as f64;
                    // average orientation as a doubled-angle circular mean
                    theta_sin += (2.0 * theta).sin();
                    theta_cos += (2.0 * theta).cos();
                    n += 1.0;
                }
            }
            let mask_mean = mask_sum / n;
            let coh_mean = coh_sum / n;

            if mask_mean >= mask_gate as f64 && coh_mean >= coherence_gate as f64 {
                let mean_theta = 0.5 * (theta_sin / n).atan2(theta_cos / n) as f32;
                let mean_theta = wrap_pi(mean_theta);
                let idx = (mean_theta / angle_step).round() as usize % bank.kernels.len();
                let kernel = &bank.kernels[idx];
                let r = (kernel.side / 2) as i32;

                for py in y..ye {
                    for px in x..xe {
                        let mut acc = 0.0f32;
                        for ky in -r..=r {
                            for kx in -r..=r {
                                let sx = (px as i32 + kx).clamp(0, width as i32 - 1) as u32;
                                let sy = (py as i32 + ky).clamp(0, height as i32 - 1) as u32;
                                acc += base.get_pixel(sx, sy).0[0] as f32 * kernel.get(kx, ky);
                            }
                        }
                        let idx = (py * width + px) as usize;
                        raw[idx] = acc;
                        filtered_flag[idx] = true;
                    }
                }
            }
            x += block;
        }
        y += block;
    }

    // normalize filtered response to [0, 255]
    let (mut lo, mut hi) = (f32::MAX, f32::MIN);
    for (i, &v) in raw.iter().enumerate() {
        if filtered_flag[i] {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    let span = (hi - lo).max(1e-6);

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let value = if filtered_flag[idx] {
                ((raw[idx] - lo) / span * 255.0).clamp(0.0, 255.0) as u8
            } else {
                // outside a Gabor-qualifying block: keep the normalized input
                base.get_pixel(x, y).0[0]
            };
            out.put_pixel(x, y, image::Luma([value]));
        }
    }

    // close small breaks within the ROI first, then mask off non-ROI pixels
    // back to the normalized input so every non-ROI pixel matches it
    // exactly rather than only up to the closing radius.
    let mut closed = super::roi::close(&out, 3);
    for y in 0..height {
        for x in 0..width {
            if mask.get_pixel(x, y).0[0] == 0 {
                closed.put_pixel(x, y, *base.get_pixel(x, y));
            }
        }
    }

    closed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_has_requested_orientation_count() {
        let bank = GaborBank::build(16, 21, 4.0, 10.0, 0.6);
        assert_eq!(bank.kernels.len(), 16);
        for k in &bank.kernels {
            assert_eq!(k.side, 21);
            assert_eq!(k.weights.len(), 21 * 21);
        }
    }

    #[test]
    fn wrap_pi_confines_to_range() {
        assert!((0.0..PI).contains(&wrap_pi(-0.1)));
        assert!((0.0..PI).contains(&wrap_pi(PI + 0.2)));
    }
}
