//! Strong type definitions for the AID registry.
//!
//! Identifiers travel as text on the wire; the newtypes keep a digest from
//! being passed where an identifier is expected, and vice versa.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{Blake3Hash, Ed25519PublicKey};

/// A self-addressing identifier: the qualified digest of a record's content.
///
/// The empty value is the placeholder a record carries while its digest is
/// being computed.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Said(String);

impl Said {
    /// Wrap digest text as received.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The empty placeholder.
    pub fn blank() -> Self {
        Self(String::new())
    }

    /// Build from a computed Blake3 hash.
    pub fn from_hash(hash: &Blake3Hash) -> Self {
        Self(hash.to_qb64())
    }

    /// Whether this is the placeholder value.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Said {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Said({})", self.0)
    }
}

impl fmt::Display for Said {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Said {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Said {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Said {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

/// An autonomic identifier: the identity that authors a record or a request.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aid(String);

impl Aid {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The identifier of a basic identity controlled by a single key.
    pub fn basic(key: &Ed25519PublicKey) -> Self {
        Self(Ed25519PublicKey::basic(*key.as_bytes()).to_qb64())
    }

    /// The key of a basic identifier, if this is one.
    ///
    /// Basic identifiers are their own key and cannot rotate, so they can be
    /// resolved without any external state.
    pub fn basic_key(&self) -> Option<Ed25519PublicKey> {
        Ed25519PublicKey::from_qb64(&self.0)
            .ok()
            .filter(|key| !key.is_transferable())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aid({})", self.0)
    }
}

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Aid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Aid {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Aid {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}
