//! # Error Types
//!
//! Errors raised while constructing core primitives. Higher layers wrap
//! these in their own `thiserror` enums.

use thiserror::Error;

/// Top-level error type for core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A period range was empty or inverted.
    #[error("invalid period range [{from}, {to}): from must be strictly less than to")]
    InvalidRange {
        /// Requested start (inclusive).
        from: u32,
        /// Requested end (exclusive).
        to: u32,
    },

    /// An account identifier could not be parsed.
    #[error("invalid account id {0:?}: expected 0x-prefixed 20-byte hex")]
    InvalidAccount(String),

    /// A digest could not be parsed.
    #[error("invalid digest {0:?}: expected 0x-prefixed 32-byte hex")]
    InvalidDigest(String),

    /// A timestamp was out of the representable range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

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
