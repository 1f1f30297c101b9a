//! Registry trait: the abstract interface for record storage.
//!
//! Handlers only see this trait, so the registry can be swapped without
//! touching the protocol code.

use async_trait::async_trait;
use aidreg_core::{Aid, Record, Said};

use crate::error::Result;

/// Result of putting a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutResult {
    /// Record was new.
    Inserted,
    /// A record with this digest is already stored. Since the digest is
    /// derived from the content, the stored record is identical.
    AlreadyExists,
}

/// The Registry trait: records keyed by digest, indexed by owner and name.
///
/// # Design Notes
///
/// - **Write once**: there is no delete or update path. Putting a record with
///   a known digest is a no-op.
/// - **Consistent indices**: the owner and name indices are updated together
///   with the primary map; a lookup never sees one without the other.
/// - **Ordering**: owner and name lookups return records in insertion order.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Insert a record, keyed by its digest.
    ///
    /// Records whose digest does not match their content are refused.
    async fn put(&self, record: &Record) -> Result<PutResult>;

    /// Get a record by digest.
    async fn get_by_digest(&self, said: &Said) -> Result<Option<Record>>;

    /// All records registered by `owner`.
    async fn get_by_owner(&self, owner: &Aid) -> Result<Vec<Record>>;

    /// All records registering `name`.
    async fn get_by_name(&self, name: &str) -> Result<Vec<Record>>;

    /// Number of stored records.
    async fn len(&self) -> Result<usize>;

    /// Whether the registry is empty.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Remove everything. Test isolation only.
    async fn clear(&self) -> Result<()>;
}
