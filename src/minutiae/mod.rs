//! Minutia extraction: crossing-number detection on the skeleton, followed
//! by orientation/quality enrichment, border filtering, and non-maximum
//! suppression.
//!
//! Orientation and quality are read from the structure-tensor fields
//! already computed during enhancement rather than recomputed here.

use crate::config::MinutiaeConfig;
use crate::types::{CoherenceMap, Minutia, MinutiaType, OrientationMap, Template};
use image::GrayImage;
use std::f32::consts::PI;

/// The 8-neighborhood in the fixed traversal order the crossing-number
/// walk depends on: starting above the pixel, proceeding counter-clockwise.
fn neighbors8(x: i32, y: i32) -> [(i32, i32); 8] {
    [
        (x, y - 1),
        (x + 1, y - 1),
        (x + 1, y),
        (x + 1, y + 1),
        (x, y + 1),
        (x - 1, y + 1),
        (x - 1, y),
        (x - 1, y - 1),
    ]
}

fn crossing_number(patch: &[u8; 8]) -> u32 {
    (0..8)
        .map(|i| if patch[i] == 0 && patch[(i + 1) % 8] == 1 { 1 } else { 0 })
        .sum()
}

struct Candidate {
    x: u32,
    y: u32,
    kind: MinutiaType,
}

/// Non-maximum suppression by Euclidean distance: sort by quality
/// descending, keep a point only if no already-kept point lies within
/// `min_dist`.
fn nms_distance(mut points: Vec<Minutia>, min_dist: f32) -> Vec<Minutia> {
    points.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap());
    let r2 = min_dist * min_dist;
    let mut kept: Vec<Minutia> = Vec::new();

    for p in points {
        let clashes = kept.iter().any(|q| {
            let dx = p.x as f32 - q.x as f32;
            let dy = p.y as f32 - q.y as f32;
            dx * dx + dy * dy < r2
        });
        if !clashes {
            kept.push(p);
        }
    }
    kept
}

/// Extract minutiae from a thinned skeleton image using crossing-number
/// classification, enriched with orientation/quality sampled from the
/// structure-tensor fields computed during enhancement.
pub fn extract_minutiae(
    skeleton: &GrayImage,
    orientation: &OrientationMap,
    coherence: &CoherenceMap,
    config: &MinutiaeConfig,
) -> Template {
    let (width, height) = skeleton.dimensions();
    let (w, h) = (width as i32, height as i32);
    let margin = config.margin as i32;

    let mut candidates = Vec::new();
    let mut y = 1 + margin;
    while y < h - 1 - margin {
        let mut x = 1 + margin;
        while x < w - 1 - margin {
            if skeleton.get_pixel(x as u32, y as u32).0[0] > 0 {
                let mut patch = [0u8; 8];
                for (i, &(nx, ny)) in neighbors8(x, y).iter().enumerate() {
                    patch[i] = if skeleton.get_pixel(nx as u32, ny as u32).0[0] > 0 { 1 } else { 0 };
                }
                let cn = crossing_number(&patch);
                let kind = match cn {
                    1 => Some(MinutiaType::Ending),
                    3 => Some(MinutiaType::Bifurcation),
                    _ => None,
                };
                if let Some(kind) = kind {
                    candidates.push(Candidate {
                        x: x as u32,
                        y: y as u32,
                        kind,
                    });
                }
            }
            x += 1;
        }
        y += 1;
    }

    let border = config.border;
    let enriched: Vec<Minutia> = candidates
        .into_iter()
        .filter(|c| c.x >= border && c.x < width - border && c.y >= border && c.y < height - border)
        .map(|c| {
            let angle_rad = orientation.sample_bilinear(c.x as f32, c.y as f32);
            let angle_deg = wrap_unoriented_degrees(angle_rad.to_degrees());
            let quality = coherence.sample_bilinear(c.x as f32, c.y as f32).clamp(0.0, 1.0);
            Minutia {
                x: c.x,
                y: c.y,
                angle: angle_deg,
                kind: c.kind,
                quality,
            }
        })
        .filter(|m| m.quality >= config.min_quality)
        .collect();

    let mut suppressed = nms_distance(enriched, config.nms_radius);
    if suppressed.len() > config.max_minutiae {
        suppressed.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap());
        suppressed.truncate(config.max_minutiae);
    }

    Template::new(suppressed)
}

/// Confine an angle in degrees to `[0, 180)`, the unoriented ridge-angle
/// convention `Minutia::angle` uses.
pub fn wrap_unoriented_degrees(angle_deg: f32) -> f32 {
    let mut a = angle_deg % 180.0;
    if a < 0.0 {
        a += 180.0;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SENSOR_HEIGHT, SENSOR_WIDTH};
    use image::Luma;

    #[test]
    fn ridge_ending_is_detected_by_crossing_number() {
        let mut skel = GrayImage::new(60, 60);
        // a straight ridge terminating at (30, 30)
        for x in 10..=30u32 {
            skel.put_pixel(x, 30, Luma([255]));
        }
        let orientation = OrientationMap::new(60, 60, 0.0);
        let coherence = CoherenceMap::new(60, 60, 0.9);
        let config = MinutiaeConfig {
            margin: 2,
            border: 2,
            min_quality: 0.0,
            nms_radius: 8.0,
            max_minutiae: 120,
        };
        let template = extract_minutiae(&skel, &orientation, &coherence, &config);
        assert!(template.iter().any(|m| m.x == 30 && m.y == 30 && m.kind == MinutiaType::Ending));
    }

    #[test]
    fn low_quality_points_are_dropped() {
        let mut skel = GrayImage::new(60, 60);
        for x in 10..=30u32 {
            skel.put_pixel(x, 30, Luma([255]));
        }
        let orientation = OrientationMap::new(60, 60, 0.0);
        let coherence = CoherenceMap::new(60, 60, 0.1);
        let config = MinutiaeConfig::default();
        let template = extract_minutiae(&skel, &orientation, &coherence, &config);
        assert!(template.is_empty());
    }

    #[test]
    fn respects_sensor_dimensions() {
        let skel = GrayImage::new(SENSOR_WIDTH, SENSOR_HEIGHT);
        let orientation = OrientationMap::new(SENSOR_WIDTH, SENSOR_HEIGHT, 0.0);
        let coherence = CoherenceMap::new(SENSOR_WIDTH, SENSOR_HEIGHT, 0.0);
        let template = extract_minutiae(&skel, &orientation, &coherence, &MinutiaeConfig::default());
        assert!(template.is_empty());
    }

    #[test]
    fn wrap_confines_to_unoriented_range() {
        assert_eq!(wrap_unoriented_degrees(-10.0), 170.0);
        assert_eq!(wrap_unoriented_degrees(190.0), 10.0);
    }
}
