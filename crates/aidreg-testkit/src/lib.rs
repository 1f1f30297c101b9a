//! # AID Registry Testkit
//!
//! Testing utilities for the AID registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known keys, canonical bytes and signature headers
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Signing identities and a ready-to-drive registry router
//!
//! ## Golden Vectors
//!
//! ```rust
//! use aidreg_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, detail) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, detail);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use aidreg_testkit::generators::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn said_is_deterministic(params: RecordParams) {
//!         let r1 = record_from_params(&params);
//!         let r2 = record_from_params(&params);
//!         prop_assert_eq!(r1.said, r2.said);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use aidreg_testkit::fixtures::{TestFixture, TestIdentity};
//!
//! let fixture = TestFixture::new();
//! let alice = TestIdentity::basic(1);
//! fixture.enroll(&alice);
//!
//! let response = fixture.send(alice.register_request(&alice.record("John Doe"))).await;
//! assert_eq!(response.status, 201);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{identities, TestFixture, TestIdentity, TestResponse};
pub use generators::{record_from_params, RecordParams};
pub use vectors::{all_vectors, signature_vectors, verify_all_vectors, GoldenVector, SignatureVector};
