//! # AID Registry Core
//!
//! Pure primitives for the AID registry: qualified encoding, self-addressing
//! digests, signature headers and signature verification.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Record`] - A self-addressed (identifier, name) binding
//! - [`Said`] - Self-addressing digest of a record
//! - [`Aid`] - Identifier of an identity
//! - [`Signage`] - One decoded bundle of a `Signature` header
//!
//! ## Integrity and authenticity
//!
//! A record's [`Said`] is checked with [`digest::verify`]. A request's
//! `Signature` header is checked with [`verify_signatures`] against the
//! signer's current key set, which callers resolve themselves.

pub mod canonical;
pub mod crypto;
pub mod digest;
pub mod error;
pub mod qualified;
pub mod record;
pub mod signage;
pub mod types;
pub mod validation;

pub use canonical::{blanked_bytes, canonical_bytes, SelfAddressing};
pub use crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::{CoreError, HeaderError, VerifyError};
pub use record::{Record, RecordList};
pub use signage::{Signage, SIGNATURE_HEADER};
pub use types::{Aid, Said};
pub use validation::{check_signage, check_signatures, verify_signatures};
