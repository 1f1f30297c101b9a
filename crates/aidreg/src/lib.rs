//! # AID Registry
//!
//! A registry of self-addressed name records. Every write and every read is
//! authenticated by the requester's signature, and every answer carries the
//! server's signature over the digest of what it returns.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aidreg::{create_router, AppState, LocalSigner, RegistryService, StaticResolver};
//! use aidreg_core::Keypair;
//! use aidreg_store::MemoryRegistry;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = RegistryService::new(
//!     Arc::new(MemoryRegistry::new()),
//!     Arc::new(StaticResolver::new().with_basic_self_resolution(true)),
//!     Arc::new(LocalSigner::from_keypair(Keypair::generate())),
//! );
//! let app = create_router(Arc::new(AppState::new(service)));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! - `aidreg-core`: encoding, digests, signature headers, verification
//! - `aidreg-store`: the record registry
//! - `aidreg`: this crate; the protocol service and its HTTP surface

pub mod api;
pub mod config;
pub mod error;
pub mod resolver;
pub mod service;
pub mod signer;

pub use api::{create_router, AppState, AID_HEADER};
pub use config::{ServerConfig, ServiceConfig};
pub use error::{ConfigError, ResolveError, ServiceError, SignError};
pub use resolver::{KeyResolver, StaticResolver};
pub use service::{ReadBody, RegistryService, Selector, Signed};
pub use signer::{LocalSigner, ResponseSigner};

// Re-export the lower layers for convenience.
pub use aidreg_core;
pub use aidreg_store;
