//! Configuration types for the fingerprint pipeline
//!
//! One struct per pipeline stage, each `Default`-initialized to tuned
//! constants, bundled behind a single entry-point config.

use serde::{Deserialize, Serialize};

/// Configuration for image enhancement (normalization, orientation field,
/// Gabor-bank filtering).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceConfig {
    /// Target mean after Hong-style normalization.
    pub target_mean: f32,
    /// Target variance after Hong-style normalization.
    pub target_variance: f32,
    /// Side length of the structure-tensor / ROI / Gabor blocks.
    pub block_size: u32,
    /// Gaussian sigma used to smooth cos(2*theta)/sin(2*theta) and coherence.
    pub orientation_smoothing_sigma: f32,
    /// Block-intensity variance threshold for ROI membership.
    pub roi_variance_threshold: f32,
    /// Number of discretized Gabor orientations in the bank.
    pub gabor_orientations: usize,
    /// Gabor kernel side length (odd).
    pub gabor_kernel_size: u32,
    /// Gabor sigma (envelope width).
    pub gabor_sigma: f32,
    /// Gabor wavelength.
    pub gabor_lambda: f32,
    /// Gabor aspect ratio.
    pub gabor_gamma: f32,
    /// Minimum ROI mask mean (0..255) for a block to be Gabor-filtered.
    pub gabor_mask_gate: f32,
    /// Minimum coherence mean for a block to be Gabor-filtered.
    pub gabor_coherence_gate: f32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            target_mean: 128.0,
            target_variance: 128.0 * 128.0,
            block_size: 16,
            orientation_smoothing_sigma: 3.0,
            roi_variance_threshold: 20.0,
            gabor_orientations: 16,
            gabor_kernel_size: 21,
            gabor_sigma: 4.0,
            gabor_lambda: 10.0,
            gabor_gamma: 0.6,
            gabor_mask_gate: 5.0,
            gabor_coherence_gate: 0.20,
        }
    }
}

/// Configuration for binarization, thinning, and spur pruning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonConfig {
    /// Adaptive-threshold window size (odd).
    pub adaptive_window: u32,
    /// Adaptive-threshold subtracted constant.
    pub adaptive_constant: f32,
    /// Median-filter radius used to denoise the binary image.
    pub median_radius: u32,
    /// Number of spur-pruning iterations.
    pub spur_prune_iterations: u32,
    /// Minimum 8-connected component size kept after pruning.
    pub min_component_size: u32,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            adaptive_window: 21,
            adaptive_constant: 5.0,
            median_radius: 1,
            spur_prune_iterations: 3,
            min_component_size: 5,
        }
    }
}

/// Configuration for minutiae extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinutiaeConfig {
    /// Pixels inside the border that are scanned for minutiae.
    pub margin: u32,
    /// Minutiae within this many pixels of the border are dropped.
    pub border: u32,
    /// Minimum quality (coherence) retained.
    pub min_quality: f32,
    /// Non-maximum-suppression distance, in pixels.
    pub nms_radius: f32,
    /// Maximum number of minutiae retained per template.
    pub max_minutiae: usize,
}

impl Default for MinutiaeConfig {
    fn default() -> Self {
        Self {
            margin: 8,
            border: 12,
            min_quality: 0.4,
            nms_radius: 8.0,
            max_minutiae: 120,
        }
    }
}

/// Configuration for the Hough-accumulator matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Maximum per-pair orientation difference allowed to vote, in degrees.
    pub angle_limit_deg: f32,
    /// Maximum inlier position error, in pixels.
    pub dist_limit_px: f32,
    /// Rotation bins scanned, in degrees, inclusive (min, max, step).
    pub rotation_range_deg: (i32, i32, i32),
    /// Translation bin step, in pixels (applied to both dx and dy).
    pub translation_step_px: f32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            angle_limit_deg: 16.0,
            dist_limit_px: 12.0,
            rotation_range_deg: (-30, 30, 3),
            translation_step_px: 2.0,
        }
    }
}

/// Configuration for template fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuserConfig {
    /// Bucket grid size, in pixels.
    pub grid_size: f32,
    /// Minimum mean quality retained per fused bucket.
    pub min_quality: f32,
}

impl Default for FuserConfig {
    fn default() -> Self {
        Self {
            grid_size: 5.0,
            min_quality: 0.35,
        }
    }
}

/// Configuration for 1-to-N identification and K-of-K verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifierConfig {
    pub score_threshold: f32,
    pub inlier_threshold: u32,
    /// Candidates recovering a rotation beyond this magnitude (degrees)
    /// are dropped before ranking.
    pub rotation_gate_deg: f32,
    /// Minimum score margin the best candidate must hold over the second.
    pub margin: f32,
    pub verify_inlier_threshold: u32,
    pub verify_score_threshold: f32,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.25,
            inlier_threshold: 12,
            rotation_gate_deg: 40.0,
            margin: 0.07,
            verify_inlier_threshold: 10,
            verify_score_threshold: 0.22,
        }
    }
}

/// Minimum minutiae count for `extract` to report success.
pub const MIN_MINUTIAE_FOR_QUALITY: usize = 20;

/// Aggregates every stage config behind one struct so callers can thread
/// a single value through `extract`, `fuse`, `verify_k_of`, and `identify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub enhance: EnhanceConfig,
    pub skeleton: SkeletonConfig,
    pub minutiae: MinutiaeConfig,
    pub matcher: MatcherConfig,
    pub fuser: FuserConfig,
    pub identifier: IdentifierConfig,
}

impl PipelineConfig {
    /// Parse a tuned parameter set from JSON, e.g. one persisted by an
    /// operator who wants to deploy a non-default threshold profile.
    pub fn from_json(data: &str) -> crate::error::Result<Self> {
        serde_json::from_str(data).map_err(|e| crate::error::FingerprintError::config(e.to_string()))
    }

    /// Serialize this parameter set to pretty-printed JSON for persistence
    /// or transmission alongside extracted templates.
    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::FingerprintError::config(e.to_string()))
    }
}
