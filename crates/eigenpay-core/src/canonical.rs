//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only input accepted by [`sha256_digest`]. It is
//! produced by serializing a value to JSON, rejecting floats, and emitting
//! RFC 8785 (JCS) canonical bytes via `serde_jcs`: sorted keys, compact
//! separators, deterministic number formatting.
//!
//! Attestation records are hashed through this path, so the operator, the
//! challenger and the attestation registry all derive the same digest for
//! the same record.
//!
//! [`sha256_digest`]: crate::digest::sha256_digest

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// The inner buffer is private; the only constructor is
/// [`CanonicalBytes::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value contains
    /// a non-integer number, or [`CanonicalizationError::SerializationFailed`]
    /// if serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let bytes = serde_jcs::to_vec(&value)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(())
            } else {
                Err(CanonicalizationError::FloatRejected(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}
