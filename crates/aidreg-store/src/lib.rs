//! # AID Registry Store
//!
//! Storage abstraction for the AID registry. Records are kept behind the
//! [`Registry`] trait so the protocol service never depends on a concrete
//! backend.
//!
//! ## Key Types
//!
//! - [`Registry`] - The async trait for all registry operations
//! - [`MemoryRegistry`] - In-memory registry living for the process lifetime
//! - [`PutResult`] - Result of putting a record
//!
//! ## Usage
//!
//! ```rust
//! use aidreg_core::{Aid, Record};
//! use aidreg_store::{MemoryRegistry, PutResult, Registry};
//!
//! async fn example() {
//!     let registry = MemoryRegistry::new();
//!     let record = Record::new(Aid::new("BAlice"), "John Doe").unwrap();
//!
//!     assert_eq!(registry.put(&record).await.unwrap(), PutResult::Inserted);
//!     assert_eq!(registry.get_by_name("John Doe").await.unwrap(), vec![record]);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Idempotent puts**: putting the same record twice returns `AlreadyExists`
//! - **Integrity at the boundary**: records whose digest does not match their
//!   content are refused
//! - **No persistence**: state lives only as long as the registry value

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryRegistry;
pub use traits::{PutResult, Registry};
