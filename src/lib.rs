//! # fingerprint-core
//!
//! Minutiae extraction, fusion, and matching for a 500-DPI optical
//! fingerprint sensor. Provides platform-agnostic image processing
//! covering enhancement, skeletonization, minutia extraction, geometric
//! matching, template fusion, and 1-to-N identification.

pub mod config;
pub mod enhance;
pub mod error;
pub mod fuser;
pub mod identifier;
pub mod matcher;
pub mod minutiae;
pub mod pipeline;
pub mod skeleton;
pub mod types;

pub use config::PipelineConfig;
pub use error::{FingerprintError, Result};
pub use pipeline::{extract, fuse, identify, verify_k_of, ExtractResult, FuseResult, VerifyResult};
pub use types::{Candidate, IdentificationResult, MatchResult, Minutia, MinutiaType, Template};
