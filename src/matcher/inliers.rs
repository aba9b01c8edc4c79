//! Inlier counting for a fixed rigid transform
//!
//! Rotate-then-translate around the probe centroid, with each gallery
//! point usable at most once. The y-axis is flipped into image space both
//! forward (`y_root - m.y`) and on the way back (`y_root - ry + dy`) —
//! both flips must use the same sign, or a transform that should recover
//! the identity silently matches nothing.

use super::hough::{angle_diff, MatchPoint};

/// Apply the rotation (about `(x_root, y_root)`) and translation a Hough
/// peak describes to a single point.
pub fn transform(
    point: MatchPoint,
    dx: f32,
    dy: f32,
    rotation_rad: f32,
    x_root: f32,
    y_root: f32,
) -> MatchPoint {
    let cx = point.x - x_root;
    let cy = y_root - point.y;

    let (sin_r, cos_r) = rotation_rad.sin_cos();
    let rx = cos_r * cx - sin_r * cy;
    let ry = sin_r * cx + cos_r * cy;

    MatchPoint {
        x: x_root + rx + dx,
        y: y_root - ry + dy,
        angle_rad: (point.angle_rad + rotation_rad).rem_euclid(std::f32::consts::PI),
    }
}

/// Greedily count matching pairs under the given transform: each gallery
/// point is consumed by at most one probe point, in probe order.
pub fn count_matches(
    probe: &[MatchPoint],
    gallery: &[MatchPoint],
    dx: f32,
    dy: f32,
    rotation_rad: f32,
    x_root: f32,
    y_root: f32,
    dist_limit: f32,
    angle_limit_rad: f32,
) -> u32 {
    let mut used = vec![false; gallery.len()];
    let mut count = 0u32;

    for m1 in probe {
        for (j, m2) in gallery.iter().enumerate() {
            if used[j] {
                continue;
            }
            let m2t = transform(*m2, dx, dy, rotation_rad, x_root, y_root);
            let d = ((m2t.x - m1.x).powi(2) + (m2t.y - m1.y).powi(2)).sqrt();
            if d > dist_limit {
                continue;
            }
            if angle_diff(m1.angle_rad, m2t.angle_rad) > angle_limit_rad {
                continue;
            }
            used[j] = true;
            count += 1;
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_matches_every_point() {
        let points = vec![
            MatchPoint { x: 5.0, y: 5.0, angle_rad: 0.1 },
            MatchPoint { x: 20.0, y: 30.0, angle_rad: 0.5 },
        ];
        let count = count_matches(&points, &points, 0.0, 0.0, 0.0, 12.5, 17.5, 12.0, 16f32.to_radians());
        assert_eq!(count, 2);
    }

    #[test]
    fn each_gallery_point_is_consumed_once() {
        let probe = vec![
            MatchPoint { x: 10.0, y: 10.0, angle_rad: 0.0 },
            MatchPoint { x: 10.0, y: 10.0, angle_rad: 0.0 },
        ];
        let gallery = vec![MatchPoint { x: 10.0, y: 10.0, angle_rad: 0.0 }];
        let count = count_matches(&probe, &gallery, 0.0, 0.0, 0.0, 10.0, 10.0, 12.0, 16f32.to_radians());
        assert_eq!(count, 1);
    }
}
