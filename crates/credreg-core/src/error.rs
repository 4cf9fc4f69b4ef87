//! # Error Types
//!
//! Errors raised while constructing core values. Registry-level failures
//! (duplicate credential, unknown credential) live in `credreg-state`.

use thiserror::Error;

/// Top-level error type for `credreg-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A value failed its constructor's validation rules.
    #[error("validation error: {0}")]
    Validation(String),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
