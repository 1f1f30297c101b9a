//! In-memory implementation of the Registry trait.
//!
//! Everything lives for the lifetime of the value. The primary map and both
//! indices sit behind a single lock so a `put` is atomic for readers.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use aidreg_core::{Aid, Record, Said};

use crate::error::{Result, StoreError};
use crate::traits::{PutResult, Registry};

/// In-memory registry.
///
/// Thread-safe via RwLock. The lock is never held across an `.await`.
pub struct MemoryRegistry {
    inner: RwLock<MemoryRegistryInner>,
}

#[derive(Default)]
struct MemoryRegistryInner {
    /// Records indexed by digest.
    records: HashMap<Said, Record>,

    /// Owner index: owner -> digests in insertion order.
    by_owner: HashMap<Aid, Vec<Said>>,

    /// Name index: name -> digests in insertion order.
    by_name: HashMap<String, Vec<Said>>,
}

impl MemoryRegistryInner {
    fn collect(&self, saids: Option<&Vec<Said>>) -> Vec<Record> {
        saids
            .map(|saids| {
                saids
                    .iter()
                    .filter_map(|said| self.records.get(said).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let indexed: usize = self.by_owner.values().map(Vec::len).sum();
        assert_eq!(indexed, self.records.len());
        let indexed: usize = self.by_name.values().map(Vec::len).sum();
        assert_eq!(indexed, self.records.len());

        for (owner, saids) in &self.by_owner {
            for said in saids {
                assert_eq!(&self.records[said].owner, owner);
            }
        }
        for (name, saids) in &self.by_name {
            for said in saids {
                assert_eq!(&self.records[said].name, name);
            }
        }
    }
}

impl MemoryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryRegistryInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryRegistryInner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryRegistryInner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn put(&self, record: &Record) -> Result<PutResult> {
        if !record.verify_said() {
            return Err(StoreError::DigestMismatch(record.said.to_string()));
        }

        let mut inner = self.write()?;

        if inner.records.contains_key(&record.said) {
            return Ok(PutResult::AlreadyExists);
        }

        inner.records.insert(record.said.clone(), record.clone());
        inner
            .by_owner
            .entry(record.owner.clone())
            .or_default()
            .push(record.said.clone());
        inner
            .by_name
            .entry(record.name.clone())
            .or_default()
            .push(record.said.clone());

        debug!(said = %record.said, owner = %record.owner, "Stored record");
        Ok(PutResult::Inserted)
    }

    async fn get_by_digest(&self, said: &Said) -> Result<Option<Record>> {
        let inner = self.read()?;
        Ok(inner.records.get(said).cloned())
    }

    async fn get_by_owner(&self, owner: &Aid) -> Result<Vec<Record>> {
        let inner = self.read()?;
        Ok(inner.collect(inner.by_owner.get(owner)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Vec<Record>> {
        let inner = self.read()?;
        Ok(inner.collect(inner.by_name.get(name)))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.write()?;
        *inner = MemoryRegistryInner::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(owner: &str, name: &str) -> Record {
        Record::new(Aid::new(owner), name).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_lookup() {
        let registry = MemoryRegistry::new();
        let r = record("BAlice", "John Doe");

        assert_eq!(registry.put(&r).await.unwrap(), PutResult::Inserted);

        assert_eq!(registry.get_by_digest(&r.said).await.unwrap(), Some(r.clone()));
        assert_eq!(registry.get_by_owner(&r.owner).await.unwrap(), vec![r.clone()]);
        assert_eq!(registry.get_by_name("John Doe").await.unwrap(), vec![r]);
        assert_eq!(registry.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_is_idempotent() {
        let registry = MemoryRegistry::new();
        let r = record("BAlice", "John Doe");

        assert_eq!(registry.put(&r).await.unwrap(), PutResult::Inserted);
        assert_eq!(registry.put(&r).await.unwrap(), PutResult::AlreadyExists);

        assert_eq!(registry.len().await.unwrap(), 1);
        assert_eq!(registry.get_by_owner(&r.owner).await.unwrap().len(), 1);
        registry.read().unwrap().assert_consistent();
    }

    #[tokio::test]
    async fn test_put_refuses_bad_digest() {
        let registry = MemoryRegistry::new();
        let mut r = record("BAlice", "John Doe");
        r.name = "Jane Doe".into();

        assert!(matches!(
            registry.put(&r).await,
            Err(StoreError::DigestMismatch(_))
        ));
        assert!(registry.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_lookups_keep_insertion_order() {
        let registry = MemoryRegistry::new();
        let names = ["one", "two", "three", "four"];
        for name in names {
            registry.put(&record("BAlice", name)).await.unwrap();
        }
        registry.put(&record("BBob", "two")).await.unwrap();

        let owned: Vec<String> = registry
            .get_by_owner(&Aid::new("BAlice"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(owned, names);

        let named: Vec<Aid> = registry
            .get_by_name("two")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.owner)
            .collect();
        assert_eq!(named, vec![Aid::new("BAlice"), Aid::new("BBob")]);
        registry.read().unwrap().assert_consistent();
    }

    #[tokio::test]
    async fn test_missing_lookups_are_empty() {
        let registry = MemoryRegistry::new();
        assert_eq!(registry.get_by_digest(&Said::new("Enope")).await.unwrap(), None);
        assert!(registry.get_by_owner(&Aid::new("Bnope")).await.unwrap().is_empty());
        assert!(registry.get_by_name("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = MemoryRegistry::new();
        let r = record("BAlice", "John Doe");
        registry.put(&r).await.unwrap();

        registry.clear().await.unwrap();

        assert_eq!(registry.get_by_digest(&r.said).await.unwrap(), None);
        assert!(registry.get_by_owner(&r.owner).await.unwrap().is_empty());
        assert!(registry.get_by_name(&r.name).await.unwrap().is_empty());
        assert!(registry.is_empty().await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_keep_indices_consistent() {
        let registry = Arc::new(MemoryRegistry::new());

        let mut handles = Vec::new();
        for w in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    // Writers overlap on half of their records.
                    let owner = format!("BWriter{}", w % 4);
                    let r = record(&owner, &format!("name-{i}"));
                    registry.put(&r).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len().await.unwrap(), 4 * 50);
        registry.read().unwrap().assert_consistent();
        assert_eq!(registry.get_by_name("name-7").await.unwrap().len(), 4);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread().build().unwrap()
        }

        proptest! {
            #[test]
            fn test_every_put_is_found_until_clear(
                entries in prop::collection::vec(("B[A-Za-z]{1,8}", "[a-z ]{0,12}"), 1..20)
            ) {
                let registry = MemoryRegistry::new();
                let records: Vec<Record> = entries
                    .iter()
                    .map(|(owner, name)| record(owner, name))
                    .collect();

                runtime().block_on(async {
                    for r in &records {
                        registry.put(r).await.unwrap();
                    }
                    for r in &records {
                        assert_eq!(registry.get_by_digest(&r.said).await.unwrap().as_ref(), Some(r));
                        assert!(registry.get_by_owner(&r.owner).await.unwrap().contains(r));
                        assert!(registry.get_by_name(&r.name).await.unwrap().contains(r));
                    }

                    registry.clear().await.unwrap();
                    for r in &records {
                        assert_eq!(registry.get_by_digest(&r.said).await.unwrap(), None);
                        assert!(registry.get_by_owner(&r.owner).await.unwrap().is_empty());
                        assert!(registry.get_by_name(&r.name).await.unwrap().is_empty());
                    }
                });
                registry.read().unwrap().assert_consistent();
            }
        }
    }
}
