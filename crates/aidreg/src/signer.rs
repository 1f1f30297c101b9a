//! The server's own signing capability.

use aidreg_core::{Aid, Ed25519PublicKey, Ed25519Signature, Keypair};

use crate::error::SignError;

/// Signs response material with the server identity's current keys.
///
/// Signature `i` must come from key `i`, so that a client can verify the
/// response with the same all-keys policy the server applies to requests.
pub trait ResponseSigner: Send + Sync {
    /// The server's identifier.
    fn aid(&self) -> &Aid;

    /// Sign `message` with every current key, in key order.
    fn sign(&self, message: &[u8]) -> Result<Vec<Ed25519Signature>, SignError>;
}

/// Signs with keypairs held in memory.
pub struct LocalSigner {
    aid: Aid,
    keypairs: Vec<Keypair>,
}

impl LocalSigner {
    /// A signer over several keys. The identifier defaults to the basic
    /// identifier of the first key.
    pub fn new(keypairs: Vec<Keypair>) -> Result<Self, SignError> {
        let first = keypairs.first().ok_or(SignError::NoKeys)?;
        Ok(Self {
            aid: Aid::basic(&first.public_key()),
            keypairs,
        })
    }

    /// A single-key basic identity.
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            aid: Aid::basic(&keypair.public_key()),
            keypairs: vec![keypair],
        }
    }

    /// Override the identifier, e.g. for an identity managed elsewhere.
    pub fn with_aid(mut self, aid: Aid) -> Self {
        self.aid = aid;
        self
    }

    /// Current public keys, in signing order.
    pub fn public_keys(&self) -> Vec<Ed25519PublicKey> {
        self.keypairs.iter().map(Keypair::public_key).collect()
    }
}

impl ResponseSigner for LocalSigner {
    fn aid(&self) -> &Aid {
        &self.aid
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<Ed25519Signature>, SignError> {
        Ok(self.keypairs.iter().map(|kp| kp.sign(message)).collect())
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("aid", &self.aid)
            .field("keys", &self.keypairs.len())
            .finish()
    }
}
