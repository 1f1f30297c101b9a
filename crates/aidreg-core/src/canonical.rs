//! Canonical JSON encoding for deterministic serialization.
//!
//! Records are encoded as compact JSON (no insignificant whitespace) with
//! fields in declaration order. Field order is fixed by the struct
//! definitions, so the same content always yields the same bytes and thus
//! the same digest.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Said;

/// Content that carries its own digest in a `d` field.
pub trait SelfAddressing: Serialize + Clone {
    /// The stated digest.
    fn said(&self) -> &Said;

    /// Replace the stated digest.
    fn set_said(&mut self, said: Said);
}

/// Encode a value to canonical JSON bytes.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec(value).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Canonical bytes of a copy of `content` with its digest field blanked.
///
/// These are the bytes the digest is computed over.
pub fn blanked_bytes<T: SelfAddressing>(content: &T) -> Result<Vec<u8>, CoreError> {
    let mut blanked = content.clone();
    blanked.set_said(Said::blank());
    canonical_bytes(&blanked)
}
