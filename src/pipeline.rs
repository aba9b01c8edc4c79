//! Request-boundary operations: the four external entry points wrapping
//! the per-stage pure functions, applying quality gating and assembling
//! response envelopes.
//!
//! Validate input, run the stages in sequence, assemble a result.
//! Internal conditions that aren't truly fatal (too few minutiae, an empty
//! probe) are reported as structured outcomes in the response rather than
//! propagated as errors past this boundary.

use crate::config::{PipelineConfig, MIN_MINUTIAE_FOR_QUALITY};
use crate::error::Result;
use crate::types::{IdentificationResult, MatchResult, Template};
use crate::{enhance, fuser, identifier, minutiae, skeleton};
use image::GrayImage;
use log::info;

/// Outcome of `extract`.
pub struct ExtractResult {
    pub ok: bool,
    pub minutiae_count: usize,
    pub template: Template,
    /// Structured reason when `ok` is false (e.g. `low_quality`).
    pub error: Option<&'static str>,
}

/// Run the full pipeline — enhance, skeletonize, extract minutiae — over
/// a raw sensor capture. Reports `low_quality` rather than failing when
/// fewer than `MIN_MINUTIAE_FOR_QUALITY` minutiae are found.
pub fn extract(image: &GrayImage, config: &PipelineConfig) -> Result<ExtractResult> {
    let enhanced = enhance::enhance(image, &config.enhance)?;
    let skeleton_out = skeleton::binarize_and_thin(&enhanced.enhanced, &config.skeleton);
    let template = minutiae::extract_minutiae(
        &skeleton_out.skeleton,
        &enhanced.orientation,
        &enhanced.coherence,
        &config.minutiae,
    );

    let minutiae_count = template.len();
    info!("extract: {minutiae_count} minutiae");

    if minutiae_count < MIN_MINUTIAE_FOR_QUALITY {
        return Ok(ExtractResult {
            ok: false,
            minutiae_count,
            template,
            error: Some("low_quality"),
        });
    }

    Ok(ExtractResult {
        ok: true,
        minutiae_count,
        template,
        error: None,
    })
}

/// Debug counters surfaced alongside a fused template.
pub struct FuseDebug {
    pub input_counts: Vec<usize>,
    pub fused_count: usize,
    pub grid_size: f32,
}

/// Outcome of `fuse`.
pub struct FuseResult {
    pub fused: Template,
    pub debug: FuseDebug,
}

/// Merge several impressions of the same finger into one template.
pub fn fuse(templates: &[Template], config: &PipelineConfig) -> FuseResult {
    let input_counts: Vec<usize> = templates.iter().map(|t| t.len()).collect();
    let fused = fuser::fuse_templates(templates, &config.fuser);
    let fused_count = fused.len();
    info!("fuse: {} templates -> {fused_count} fused minutiae", templates.len());

    FuseResult {
        debug: FuseDebug {
            input_counts,
            fused_count,
            grid_size: config.fuser.grid_size,
        },
        fused,
    }
}

/// Outcome of `verify_k_of`.
pub struct VerifyResult {
    pub accepted: bool,
    pub best: MatchResult,
    pub all: Vec<MatchResult>,
}

/// Verify a probe template against up to K enrolment templates, accepting
/// if any clears the (looser) verification thresholds.
pub fn verify_k_of(probe: &Template, templates: &[Template], config: &PipelineConfig) -> VerifyResult {
    let all: Vec<MatchResult> = templates
        .iter()
        .map(|t| crate::matcher::match_templates(probe, t, &config.matcher))
        .collect();

    let (accepted, best) =
        identifier::verify_k_of(probe, templates, &config.matcher, &config.identifier);

    info!("verify_k_of: accepted={accepted} best.inliers={} best.score={:.3}", best.inliers, best.score);
    VerifyResult { accepted, best, all }
}

/// Identify a probe against a gallery of `(template, id)` pairs. An empty
/// probe is reported as `reason: Some("probe_empty")` rather than being
/// indistinguishable from "no candidate accepted".
pub fn identify<Id: Clone>(
    probe: &Template,
    gallery_list: &[(Template, Id)],
    config: &PipelineConfig,
) -> IdentificationResult<Id> {
    let result = identifier::identify(probe, gallery_list, &config.matcher, &config.identifier);
    info!(
        "identify: {} candidates ranked, best={:?}, reason={:?}",
        result.ranking.len(),
        result.best.as_ref().map(|b| b.score),
        result.reason
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Minutia, MinutiaType, SENSOR_HEIGHT, SENSOR_WIDTH};
    use image::Luma;

    #[test]
    fn blank_capture_reports_low_quality() {
        let img = GrayImage::from_pixel(SENSOR_WIDTH, SENSOR_HEIGHT, Luma([128]));
        let result = extract(&img, &PipelineConfig::default()).unwrap();
        assert!(!result.ok);
        assert_eq!(result.error, Some("low_quality"));
    }

    #[test]
    fn empty_probe_identify_reports_probe_empty() {
        let probe = Template::default();
        let gallery: Vec<(Template, u32)> = vec![];
        let result = identify(&probe, &gallery, &PipelineConfig::default());
        assert!(result.best.is_none());
        assert!(result.ranking.is_empty());
        assert_eq!(result.reason, Some("probe_empty"));
    }

    #[test]
    fn fuse_reports_input_and_fused_counts() {
        let t1: Template = vec![Minutia {
            x: 100,
            y: 100,
            angle: 10.0,
            kind: MinutiaType::Ending,
            quality: 0.9,
        }]
        .into_iter()
        .collect();
        let t2: Template = vec![Minutia {
            x: 101,
            y: 99,
            angle: 12.0,
            kind: MinutiaType::Ending,
            quality: 0.8,
        }]
        .into_iter()
        .collect();
        let result = fuse(&[t1, t2], &PipelineConfig::default());
        assert_eq!(result.debug.input_counts, vec![1, 1]);
        assert_eq!(result.debug.fused_count, 1);
        assert_eq!(result.fused.len(), 1);
    }
}
