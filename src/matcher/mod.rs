//! Pairwise template matching: Hough-accumulator rotation/translation
//! search followed by greedy inlier counting.

mod hough;
mod inliers;

use crate::config::MatcherConfig;
use crate::types::{MatchResult, Template};
use hough::MatchPoint;
use std::f32::consts::PI;

fn to_match_points(template: &Template) -> Vec<MatchPoint> {
    template
        .iter()
        .map(|m| MatchPoint {
            x: m.x as f32,
            y: m.y as f32,
            angle_rad: m.angle.to_radians().rem_euclid(PI),
        })
        .collect()
}

/// Match `probe` against `gallery`, searching rotation/translation via a
/// Hough accumulator rooted at the probe centroid, then scoring by greedy
/// inlier count normalized to the smaller template.
pub fn match_templates(probe: &Template, gallery: &Template, config: &MatcherConfig) -> MatchResult {
    if probe.is_empty() || gallery.is_empty() {
        return MatchResult::empty("no_points");
    }

    let probe_points = to_match_points(probe);
    let gallery_points = to_match_points(gallery);

    let angle_limit_rad = config.angle_limit_deg.to_radians();
    let peak = hough::accumulate_hough(
        &probe_points,
        &gallery_points,
        angle_limit_rad,
        config.rotation_range_deg,
        config.translation_step_px,
    );

    let x_root = probe_points.iter().map(|m| m.x).sum::<f32>() / probe_points.len() as f32;
    let y_root = probe_points.iter().map(|m| m.y).sum::<f32>() / probe_points.len() as f32;

    let inlier_count = inliers::count_matches(
        &probe_points,
        &gallery_points,
        peak.dx,
        peak.dy,
        peak.rotation_rad,
        x_root,
        y_root,
        config.dist_limit_px,
        angle_limit_rad,
    );

    let min_ref = probe_points.len().min(gallery_points.len()) as f32;
    let score = inlier_count as f32 / min_ref;

    MatchResult {
        ok: true,
        inliers: inlier_count,
        score,
        dx: peak.dx,
        dy: peak.dy,
        rotation_rad: peak.rotation_rad,
        votes: peak.votes,
        reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Minutia, MinutiaType};

    fn minutia(x: u32, y: u32, angle: f32) -> Minutia {
        Minutia {
            x,
            y,
            angle,
            kind: MinutiaType::Ending,
            quality: 0.8,
        }
    }

    #[test]
    fn identical_templates_match_with_full_score() {
        let template: Template = vec![
            minutia(40, 40, 10.0),
            minutia(80, 60, 30.0),
            minutia(120, 100, 60.0),
            minutia(60, 150, 90.0),
        ]
        .into_iter()
        .collect();

        let result = match_templates(&template, &template, &MatcherConfig::default());
        assert!(result.ok);
        assert_eq!(result.inliers, 4);
        assert!((result.score - 1.0).abs() < 1e-5);
        assert!(result.rotation_deg().abs() < 3.01);
    }

    #[test]
    fn empty_templates_report_no_points() {
        let empty = Template::default();
        let other: Template = vec![minutia(10, 10, 0.0)].into_iter().collect();
        let result = match_templates(&empty, &other, &MatcherConfig::default());
        assert!(!result.ok);
        assert_eq!(result.reason, Some("no_points"));
    }

    #[test]
    fn unrelated_templates_score_low() {
        let probe: Template = vec![minutia(10, 10, 0.0), minutia(20, 280, 45.0)]
            .into_iter()
            .collect();
        let gallery: Template = vec![minutia(250, 15, 90.0), minutia(200, 300, 150.0)]
            .into_iter()
            .collect();
        let result = match_templates(&probe, &gallery, &MatcherConfig::default());
        assert!(result.score <= 1.0);
    }
}
