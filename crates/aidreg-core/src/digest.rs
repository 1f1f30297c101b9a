//! Self-addressing digests.
//!
//! A digest is Blake3-256 over the canonical bytes of the content with its
//! own digest field blanked, rendered as qualified text (`E...`). Verifying a
//! digest means recomputing it; nothing else establishes that the stated
//! identifier belongs to the stated content.

use crate::canonical::{blanked_bytes, SelfAddressing};
use crate::crypto::Blake3Hash;
use crate::error::CoreError;
use crate::types::Said;

/// Compute the digest of `content`. The stated digest is ignored.
pub fn compute<T: SelfAddressing>(content: &T) -> Result<Said, CoreError> {
    let bytes = blanked_bytes(content)?;
    Ok(Said::from_hash(&Blake3Hash::hash(&bytes)))
}

/// Check that the stated digest of `content` matches its recomputation.
///
/// Content that cannot be canonically encoded does not verify.
pub fn verify<T: SelfAddressing>(content: &T) -> bool {
    match compute(content) {
        Ok(computed) => computed == *content.said(),
        Err(_) => false,
    }
}

/// Return `content` with its digest field filled in.
pub fn saidify<T: SelfAddressing>(mut content: T) -> Result<T, CoreError> {
    let said = compute(&content)?;
    content.set_said(said);
    Ok(content)
}
