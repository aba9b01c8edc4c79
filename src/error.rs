//! Error types for the fingerprint-core library

use thiserror::Error;

/// Fatal, request-ending errors.
///
/// Everything else that isn't truly fatal (`low_quality`, `no_points`,
/// `probe_empty`) is modeled as data inside the relevant result type
/// rather than as a variant here — see the `reason`/`error` fields on
/// `ExtractResult`, `MatchResult`, and `IdentificationResult`.
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("image dimensions {width}x{height} are neither 354x296 nor 296x354")]
    InputShape { width: u32, height: u32 },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl FingerprintError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, FingerprintError>;
