//! Hough-accumulator rotation/translation search
//!
//! A brute-force 3-D vote over (rotation, dx, dy) bins, rooted at the
//! probe centroid with the y-axis flipped to image space.

use std::f32::consts::PI;

/// A minutia reduced to the fields the matcher needs: position and
/// unoriented ridge angle in radians, `[0, pi)`.
#[derive(Clone, Copy)]
pub struct MatchPoint {
    pub x: f32,
    pub y: f32,
    pub angle_rad: f32,
}

/// Minimal absolute difference between two angles, modulo pi.
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let mut d = (a - b).abs() % PI;
    if d > PI / 2.0 {
        d = PI - d;
    }
    d
}

/// Result of the Hough vote: the winning transform and its vote count.
pub struct HoughPeak {
    pub dx: f32,
    pub dy: f32,
    pub rotation_rad: f32,
    pub votes: u32,
}

/// Nearest index into a uniformly-stepped bin set starting at `start` with
/// spacing `step`, clamped to `count` bins.
fn nearest_bin(value: f32, start: f32, step: f32, count: usize) -> usize {
    let idx = ((value - start) / step).round();
    idx.clamp(0.0, (count - 1) as f32) as usize
}

/// Vote for the (rotation, dx, dy) transform that best aligns `probe` onto
/// `gallery`, rooted at the probe's centroid. Rotation is searched over
/// `rotation_range_deg` (inclusive min/max, step), translation over bins
/// spanning the combined point cloud extent at `translation_step_px`.
pub fn accumulate_hough(
    probe: &[MatchPoint],
    gallery: &[MatchPoint],
    angle_limit_rad: f32,
    rotation_range_deg: (i32, i32, i32),
    translation_step_px: f32,
) -> HoughPeak {
    let (rot_min, rot_max, rot_step) = rotation_range_deg;
    let angle_set_deg: Vec<i32> = (rot_min..=rot_max).step_by(rot_step as usize).collect();

    let x_root = probe.iter().map(|m| m.x).sum::<f32>() / probe.len() as f32;
    let y_root = probe.iter().map(|m| m.y).sum::<f32>() / probe.len() as f32;

    let xs_all: Vec<f32> = probe.iter().chain(gallery.iter()).map(|m| m.x).collect();
    let ys_all: Vec<f32> = probe.iter().chain(gallery.iter()).map(|m| m.y).collect();
    let w = xs_all.iter().cloned().fold(f32::MIN, f32::max)
        - xs_all.iter().cloned().fold(f32::MAX, f32::min)
        + 1.0;
    let h = ys_all.iter().cloned().fold(f32::MIN, f32::max)
        - ys_all.iter().cloned().fold(f32::MAX, f32::min)
        + 1.0;

    let dx_count = ((2.0 * w) / translation_step_px).floor() as usize + 2;
    let dy_count = ((2.0 * h) / translation_step_px).floor() as usize + 2;
    let dx_start = -w;
    let dy_start = -h;

    let mut accumulator = vec![0u32; dx_count * dy_count * angle_set_deg.len()];

    for m1 in probe {
        let c1x = m1.x - x_root;
        let c1y = y_root - m1.y;

        for m2 in gallery {
            let c2x = m2.x - x_root;
            let c2y = y_root - m2.y;

            for (a_idx, &a_deg) in angle_set_deg.iter().enumerate() {
                let a_rad = (a_deg as f32).to_radians();

                if angle_diff(m1.angle_rad, m2.angle_rad + a_rad) > angle_limit_rad {
                    continue;
                }

                let (sin_a, cos_a) = a_rad.sin_cos();
                let rx = cos_a * c2x - sin_a * c2y;
                let ry = sin_a * c2x + cos_a * c2y;

                let dx = c1x - rx;
                let dy = c1y - ry;

                let dx_idx = nearest_bin(dx, dx_start, translation_step_px, dx_count);
                let dy_idx = nearest_bin(dy, dy_start, translation_step_px, dy_count);

                let idx = (dx_idx * dy_count + dy_idx) * angle_set_deg.len() + a_idx;
                accumulator[idx] += 1;
            }
        }
    }

    let mut best_idx = 0usize;
    let mut best_votes = 0u32;
    for (idx, &votes) in accumulator.iter().enumerate() {
        if votes > best_votes {
            best_votes = votes;
            best_idx = idx;
        }
    }

    let n_angles = angle_set_deg.len();
    let a_idx = best_idx % n_angles;
    let rest = best_idx / n_angles;
    let dy_idx = rest % dy_count;
    let dx_idx = rest / dy_count;

    HoughPeak {
        dx: dx_start + dx_idx as f32 * translation_step_px,
        dy: dy_start + dy_idx as f32 * translation_step_px,
        rotation_rad: (angle_set_deg[a_idx] as f32).to_radians(),
        votes: best_votes,
    }
}
