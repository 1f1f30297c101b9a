//! Error types for the AID registry core.

use thiserror::Error;

/// Core errors that can occur while encoding, decoding or digesting material.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown derivation code: {0}")]
    UnknownCode(String),

    #[error("invalid qualified length for code {code}: expected {expected}, got {got}")]
    InvalidLength {
        code: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("non-zero pad bits in qualified text")]
    NonZeroPad,

    #[error("signature index {0} exceeds the single-digit index range")]
    IndexOutOfRange(u32),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Malformed `Signature` header. Distinct from a failed verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("empty signature header")]
    Empty,

    #[error("empty signature bundle")]
    EmptyBundle,

    #[error("signature bundle is missing the indexed item")]
    MissingIndexed,

    #[error("invalid indexed value: {0}")]
    InvalidIndexed(String),

    #[error("malformed header item: {0}")]
    MalformedItem(String),

    #[error("header value for {0} is not quoted")]
    UnquotedValue(String),

    #[error("duplicate tag in signature bundle: {0}")]
    DuplicateTag(String),

    #[error("non-numeric signature tag: {0}")]
    NonNumericTag(String),

    #[error("signature tag {0} is out of range")]
    TagOutOfRange(String),

    #[error("unsupported signature kind: {0}")]
    UnsupportedKind(String),

    #[error("invalid signature at tag {tag}: {reason}")]
    InvalidSignature { tag: u8, reason: String },

    #[error("signature at tag {tag} carries embedded index {embedded}")]
    IndexMismatch { tag: u8, embedded: u8 },

    #[error("signature bundle carries no signatures")]
    NoSignatures,

    #[error("too many signatures for one bundle: {0}")]
    TooManySignatures(usize),
}

/// Why a signature header failed to verify.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("malformed signature header: {0}")]
    Malformed(#[from] HeaderError),

    #[error("signature header decoded to no bundles")]
    NoBundles,

    #[error("signature bundle is not indexed")]
    NotIndexed,

    #[error("no verification keys supplied")]
    EmptyKeySet,

    #[error("missing signature for key index {0}")]
    MissingIndex(usize),

    #[error("signature at index {0} does not verify")]
    BadSignature(usize),
}
