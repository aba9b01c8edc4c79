//! 1-to-N identification and K-of-K verification
//!
//! The rotation gate reads the recovered rotation straight off
//! `MatchResult::rotation_rad`, which `match_templates` always populates —
//! a candidate whose estimated rotation exceeds the configured gate never
//! reaches the ranking.

use crate::config::{IdentifierConfig, MatcherConfig};
use crate::matcher::match_templates;
use crate::types::{Candidate, IdentificationResult, MatchResult, Template};

/// Run the probe against every `(gallery, id)` pair, drop candidates whose
/// recovered rotation exceeds the configured gate, rank the rest by
/// `(score, inliers)` descending, and accept the best if it clears the
/// score/inlier thresholds and holds a sufficient margin over the second.
pub fn identify<Id: Clone>(
    probe: &Template,
    gallery_list: &[(Template, Id)],
    matcher_config: &MatcherConfig,
    config: &IdentifierConfig,
) -> IdentificationResult<Id> {
    if probe.is_empty() {
        return IdentificationResult {
            best: None,
            ranking: Vec::new(),
            reason: Some("probe_empty"),
        };
    }

    let mut ranking: Vec<Candidate<Id>> = Vec::new();

    for (gallery, id) in gallery_list {
        if gallery.is_empty() {
            continue;
        }
        let result = match_templates(probe, gallery, matcher_config);
        if !result.ok {
            continue;
        }
        if result.rotation_deg().abs() > config.rotation_gate_deg {
            continue;
        }
        ranking.push(Candidate {
            id: id.clone(),
            score: result.score,
            inliers: result.inliers,
            angle_deg: result.rotation_deg(),
        });
    }

    ranking.sort_by(|a, b| {
        (b.score, b.inliers)
            .partial_cmp(&(a.score, a.inliers))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if ranking.is_empty() {
        return IdentificationResult { best: None, ranking, reason: None };
    }

    let best = &ranking[0];
    let second = ranking.get(1);

    let accepted = best.score >= config.score_threshold
        && best.inliers >= config.inlier_threshold
        && second.map_or(true, |s| best.score - s.score >= config.margin);

    let best_candidate = if accepted { Some(ranking[0].clone()) } else { None };
    IdentificationResult { best: best_candidate, ranking, reason: None }
}

/// 1-of-K verification: accept if any of the `k` enrolment templates
/// matches the probe above the (looser) verification thresholds. Reports
/// the max-by-`(inliers, score)` match regardless of accept outcome.
pub fn verify_k_of(
    probe: &Template,
    templates: &[Template],
    matcher_config: &MatcherConfig,
    config: &IdentifierConfig,
) -> (bool, MatchResult) {
    let mut best: Option<MatchResult> = None;
    let mut accepted = false;

    for template in templates {
        if template.is_empty() {
            continue;
        }
        let result = match_templates(probe, template, matcher_config);
        if !result.ok {
            continue;
        }
        if result.inliers >= config.verify_inlier_threshold
            && result.score >= config.verify_score_threshold
        {
            accepted = true;
        }
        let better = match &best {
            None => true,
            Some(current) => {
                (result.inliers, result.score) > (current.inliers, current.score)
            }
        };
        if better {
            best = Some(result);
        }
    }

    (accepted, best.unwrap_or_else(|| MatchResult::empty("probe_empty")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Minutia, MinutiaType};

    fn minutia(x: u32, y: u32, angle: f32) -> Minutia {
        Minutia { x, y, angle, kind: MinutiaType::Ending, quality: 0.8 }
    }

    fn dense_template(offset: u32) -> Template {
        (0..15)
            .map(|i| minutia(20 + offset + i * 6, 30 + (i * 13) % 200, (i as f32 * 11.0) % 180.0))
            .collect()
    }

    #[test]
    fn probe_empty_yields_no_ranking() {
        let probe = Template::default();
        let gallery = vec![(dense_template(0), 1u32)];
        let result = identify(&probe, &gallery, &MatcherConfig::default(), &IdentifierConfig::default());
        assert!(result.ranking.is_empty());
        assert!(result.best.is_none());
        assert_eq!(result.reason, Some("probe_empty"));
    }

    #[test]
    fn identical_single_candidate_is_accepted() {
        let probe = dense_template(0);
        let gallery = vec![(dense_template(0), "alice")];
        let result = identify(&probe, &gallery, &MatcherConfig::default(), &IdentifierConfig::default());
        assert!(result.best.is_some());
        assert_eq!(result.best.unwrap().id, "alice");
    }

    #[test]
    fn verify_k_of_accepts_when_any_template_matches() {
        let probe = dense_template(0);
        let templates = vec![dense_template(100), dense_template(0)];
        let (accepted, best) =
            verify_k_of(&probe, &templates, &MatcherConfig::default(), &IdentifierConfig::default());
        assert!(accepted);
        assert!(best.inliers >= 10);
    }
}
