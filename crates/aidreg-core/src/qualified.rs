//! Qualified base64 text encoding.
//!
//! Every piece of cryptographic material that crosses the wire is rendered
//! as a derivation code followed by URL-safe base64 of the raw bytes. The raw
//! bytes are left-padded with zeros until their length is a multiple of three,
//! and the code replaces the base64 characters that only carry pad bits. The
//! result has a fixed length per code and needs no `=` padding.
//!
//! | code | material                               | raw | text |
//! |------|----------------------------------------|-----|------|
//! | `E`  | Blake3-256 digest                      | 32  | 44   |
//! | `B`  | Ed25519 key, non-transferable          | 32  | 44   |
//! | `D`  | Ed25519 key, transferable              | 32  | 44   |
//! | `0B` | Ed25519 signature                      | 64  | 88   |
//! | `A?` | Ed25519 signature with index digit `?` | 64  | 88   |

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::CoreError;

const B64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Derivation code of a qualified value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// Blake3-256 digest.
    Blake3Digest,
    /// Ed25519 verification key of a non-transferable (basic) identifier.
    Ed25519Basic,
    /// Ed25519 verification key of a transferable identifier.
    Ed25519,
    /// Unindexed Ed25519 signature.
    Ed25519Sig,
    /// Ed25519 signature tagged with a key index in `0..64`.
    Ed25519IndexedSig(u8),
}

impl Code {
    /// Number of raw bytes carried by this code.
    pub const fn raw_len(self) -> usize {
        match self {
            Code::Blake3Digest | Code::Ed25519Basic | Code::Ed25519 => 32,
            Code::Ed25519Sig | Code::Ed25519IndexedSig(_) => 64,
        }
    }

    /// Number of code characters.
    pub const fn code_len(self) -> usize {
        match self {
            Code::Blake3Digest | Code::Ed25519Basic | Code::Ed25519 => 1,
            Code::Ed25519Sig | Code::Ed25519IndexedSig(_) => 2,
        }
    }

    /// Total length of the qualified text.
    pub const fn text_len(self) -> usize {
        (self.raw_len() + self.code_len()) / 3 * 4
    }

    /// The code characters.
    pub fn text(self) -> String {
        match self {
            Code::Blake3Digest => "E".into(),
            Code::Ed25519Basic => "B".into(),
            Code::Ed25519 => "D".into(),
            Code::Ed25519Sig => "0B".into(),
            Code::Ed25519IndexedSig(index) => {
                let mut s = String::with_capacity(2);
                s.push('A');
                s.push(B64_ALPHABET[usize::from(index & 0x3f)] as char);
                s
            }
        }
    }

    /// Read the code at the front of a qualified string.
    pub fn parse_prefix(text: &str) -> Result<Self, CoreError> {
        let bytes = text.as_bytes();
        match bytes.first() {
            Some(b'E') => Ok(Code::Blake3Digest),
            Some(b'B') => Ok(Code::Ed25519Basic),
            Some(b'D') => Ok(Code::Ed25519),
            Some(b'0') => match bytes.get(1) {
                Some(b'B') => Ok(Code::Ed25519Sig),
                _ => Err(CoreError::UnknownCode(prefix(text, 2))),
            },
            Some(b'A') => {
                let digit = bytes
                    .get(1)
                    .and_then(|c| b64_index(*c))
                    .ok_or_else(|| CoreError::UnknownCode(prefix(text, 2)))?;
                Ok(Code::Ed25519IndexedSig(digit))
            }
            _ => Err(CoreError::UnknownCode(prefix(text, 1))),
        }
    }
}

/// Encode raw material under the given code.
pub fn encode(code: Code, raw: &[u8]) -> Result<String, CoreError> {
    if raw.len() != code.raw_len() {
        return Err(CoreError::InvalidLength {
            code: code.text(),
            expected: code.raw_len(),
            got: raw.len(),
        });
    }

    let pad = code.code_len();
    let mut padded = vec![0u8; pad];
    padded.extend_from_slice(raw);

    let body = URL_SAFE_NO_PAD.encode(&padded);
    let mut out = code.text();
    out.push_str(&body[pad..]);
    Ok(out)
}

/// Decode qualified text into its code and raw bytes.
pub fn decode(text: &str) -> Result<(Code, Vec<u8>), CoreError> {
    let code = Code::parse_prefix(text)?;
    if text.len() != code.text_len() {
        return Err(CoreError::InvalidLength {
            code: code.text(),
            expected: code.text_len(),
            got: text.len(),
        });
    }

    let pad = code.code_len();
    let mut b64 = "A".repeat(pad);
    b64.push_str(&text[pad..]);

    let padded = URL_SAFE_NO_PAD
        .decode(b64.as_bytes())
        .map_err(|e| CoreError::Base64(e.to_string()))?;

    if padded[..pad].iter().any(|b| *b != 0) {
        return Err(CoreError::NonZeroPad);
    }

    Ok((code, padded[pad..].to_vec()))
}

fn b64_index(c: u8) -> Option<u8> {
    B64_ALPHABET.iter().position(|a| *a == c).map(|p| p as u8)
}

fn prefix(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
