//! Cryptographic primitives for the AID registry.
//!
//! Wraps Ed25519 signing and Blake3 hashing with strong types whose text form
//! is the qualified encoding from [`crate::qualified`].

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::CoreError;
use crate::qualified::{self, Code};

/// A 32-byte Blake3 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blake3Hash(pub [u8; 32]);

impl Blake3Hash {
    /// Compute the Blake3 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Qualified text form (`E` code).
    pub fn to_qb64(&self) -> String {
        // Length is fixed by the array type.
        qualified::encode(Code::Blake3Digest, &self.0).unwrap_or_default()
    }
}

impl fmt::Debug for Blake3Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blake3({})", &self.to_hex()[..16])
    }
}

/// An Ed25519 verification key.
///
/// Carries whether the key belongs to a transferable identifier, since that
/// selects its derivation code (`D`) over the basic one (`B`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey {
    bytes: [u8; 32],
    transferable: bool,
}

impl Ed25519PublicKey {
    /// A non-transferable (basic) key.
    pub const fn basic(bytes: [u8; 32]) -> Self {
        Self {
            bytes,
            transferable: false,
        }
    }

    /// A transferable key.
    pub const fn transferable(bytes: [u8; 32]) -> Self {
        Self {
            bytes,
            transferable: true,
        }
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Whether this key is tagged transferable.
    pub const fn is_transferable(&self) -> bool {
        self.transferable
    }

    fn code(&self) -> Code {
        if self.transferable {
            Code::Ed25519
        } else {
            Code::Ed25519Basic
        }
    }

    /// Qualified text form.
    pub fn to_qb64(&self) -> String {
        qualified::encode(self.code(), &self.bytes).unwrap_or_default()
    }

    /// Parse from qualified text.
    pub fn from_qb64(text: &str) -> Result<Self, CoreError> {
        let (code, raw) = qualified::decode(text)?;
        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidPublicKey)?;
        match code {
            Code::Ed25519Basic => Ok(Self::basic(bytes)),
            Code::Ed25519 => Ok(Self::transferable(bytes)),
            other => Err(CoreError::UnknownCode(other.text())),
        }
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.bytes).map_err(|_| CoreError::InvalidPublicKey)?;

        let sig = Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_qb64()[..12])
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_qb64())
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_qb64())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_qb64(&text).map_err(serde::de::Error::custom)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Qualified text form tagged with a key index.
    pub fn to_indexed_qb64(&self, index: u8) -> Result<String, CoreError> {
        if index >= 64 {
            return Err(CoreError::IndexOutOfRange(index.into()));
        }
        qualified::encode(Code::Ed25519IndexedSig(index), &self.0)
    }

    /// Qualified text form without an index.
    pub fn to_qb64(&self) -> String {
        qualified::encode(Code::Ed25519Sig, &self.0).unwrap_or_default()
    }

    /// Parse qualified text, returning the embedded index if it has one.
    pub fn from_qb64(text: &str) -> Result<(Self, Option<u8>), CoreError> {
        let (code, raw) = qualified::decode(text)?;
        let bytes: [u8; 64] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::InvalidSignature)?;
        match code {
            Code::Ed25519Sig => Ok((Self(bytes), None)),
            Code::Ed25519IndexedSig(index) => Ok((Self(bytes), Some(index))),
            other => Err(CoreError::UnknownCode(other.text())),
        }
    }
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", &self.to_hex()[..16])
    }
}

impl From<[u8; 64]> for Ed25519Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

/// A keypair for signing requests and responses.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key, tagged as a basic (non-transferable) key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey::basic(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        let sig = self.signing_key.sign(message);
        Ed25519Signature(sig.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}
