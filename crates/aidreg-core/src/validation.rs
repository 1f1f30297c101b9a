//! Signature verification against a resolved key set.
//!
//! Policy: every key of the signer's current key set must have produced a
//! valid signature at its own index. There is no threshold; a key set of
//! three keys needs signatures at indices 0, 1 and 2.

use crate::crypto::Ed25519PublicKey;
use crate::error::VerifyError;
use crate::signage::{self, Signage};

/// Verify a `Signature` header over `message` against `keys`.
///
/// Never fails loudly: malformed headers, missing indices and bad
/// signatures all yield `false`.
pub fn verify_signatures(header: &str, message: &[u8], keys: &[Ed25519PublicKey]) -> bool {
    check_signatures(header, message, keys).is_ok()
}

/// Like [`verify_signatures`], but reports why verification failed.
///
/// Only the first bundle of the header is consulted.
pub fn check_signatures(
    header: &str,
    message: &[u8],
    keys: &[Ed25519PublicKey],
) -> Result<(), VerifyError> {
    let bundles = signage::decode(header)?;
    let bundle = bundles.first().ok_or(VerifyError::NoBundles)?;
    check_signage(bundle, message, keys)
}

/// Verify an already decoded bundle.
pub fn check_signage(
    bundle: &Signage,
    message: &[u8],
    keys: &[Ed25519PublicKey],
) -> Result<(), VerifyError> {
    if !bundle.is_indexed() {
        return Err(VerifyError::NotIndexed);
    }
    if keys.is_empty() {
        return Err(VerifyError::EmptyKeySet);
    }

    for (i, key) in keys.iter().enumerate() {
        let sig = u8::try_from(i)
            .ok()
            .and_then(|index| bundle.marker(index))
            .ok_or(VerifyError::MissingIndex(i))?;

        key.verify(message, sig)
            .map_err(|_| VerifyError::BadSignature(i))?;
    }

    Ok(())
}
