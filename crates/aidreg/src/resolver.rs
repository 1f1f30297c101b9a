//! Identity resolution: identifier to current key set.
//!
//! Key management lives outside this service. The registry only asks, per
//! request, which keys an identifier currently answers to; answers are never
//! cached here so that a rotation elsewhere takes effect immediately.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use aidreg_core::{Aid, Ed25519PublicKey};

use crate::error::{ConfigError, ResolveError};

/// Resolves an identifier to its ordered list of current verification keys.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, aid: &Aid) -> Result<Vec<Ed25519PublicKey>, ResolveError>;
}

/// A resolver backed by a fixed table.
///
/// Optionally, basic identifiers (a single non-transferable key, code `B`)
/// that are not in the table resolve to their own key.
#[derive(Debug)]
pub struct StaticResolver {
    keys: RwLock<HashMap<Aid, Vec<Ed25519PublicKey>>>,
    self_resolve_basic: bool,
}

/// On-disk form: `{"<aid>": ["<key>", ...]}`.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct IdentitiesFile(HashMap<Aid, Vec<Ed25519PublicKey>>);

impl StaticResolver {
    /// An empty table that does not self-resolve.
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            self_resolve_basic: false,
        }
    }

    /// Let basic identifiers absent from the table resolve to their own key.
    pub fn with_basic_self_resolution(mut self, enabled: bool) -> Self {
        self.self_resolve_basic = enabled;
        self
    }

    /// Load a JSON table from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let IdentitiesFile(table) =
            serde_json::from_str(&json).map_err(|e| ConfigError::Identities {
                path: shown.clone(),
                reason: e.to_string(),
            })?;
        info!(path = %shown, identities = table.len(), "Loaded identities");
        Ok(Self {
            keys: RwLock::new(table),
            self_resolve_basic: false,
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Aid, Vec<Ed25519PublicKey>>>, ResolveError> {
        self.keys.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Aid, Vec<Ed25519PublicKey>>>, ResolveError> {
        self.keys.write().map_err(|_| poisoned())
    }

    /// Set the key list of an identity, replacing any previous one.
    pub fn insert(&self, aid: Aid, keys: Vec<Ed25519PublicKey>) -> Result<(), ResolveError> {
        self.write()?.insert(aid, keys);
        Ok(())
    }

    /// Forget an identity.
    pub fn remove(&self, aid: &Aid) -> Result<bool, ResolveError> {
        Ok(self.write()?.remove(aid).is_some())
    }

    /// Number of identities in the table.
    pub fn len(&self) -> Result<usize, ResolveError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ResolveError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> ResolveError {
    warn!("Identity table lock poisoned");
    ResolveError::Unavailable("identity table poisoned".into())
}

impl Default for StaticResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyResolver for StaticResolver {
    async fn resolve(&self, aid: &Aid) -> Result<Vec<Ed25519PublicKey>, ResolveError> {
        let table = self.read()?;

        if let Some(keys) = table.get(aid) {
            return Ok(keys.clone());
        }

        if self.self_resolve_basic {
            if let Some(key) = aid.basic_key() {
                return Ok(vec![key]);
            }
        }

        Err(ResolveError::UnknownIdentity(aid.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidreg_core::Keypair;
    use std::io::Write;

    #[tokio::test]
    async fn test_resolve_known_identity() {
        let resolver = StaticResolver::new();
        let keys = vec![
            Keypair::from_seed(&[1; 32]).public_key(),
            Keypair::from_seed(&[2; 32]).public_key(),
        ];
        let aid = Aid::new("Eidentity");
        resolver.insert(aid.clone(), keys.clone()).unwrap();

        assert_eq!(resolver.resolve(&aid).await.unwrap(), keys);
    }

    #[tokio::test]
    async fn test_unknown_identity() {
        let resolver = StaticResolver::new();
        let result = resolver.resolve(&Aid::new("Enobody")).await;
        assert!(matches!(result, Err(ResolveError::UnknownIdentity(_))));
    }

    #[tokio::test]
    async fn test_basic_self_resolution() {
        let key = Keypair::from_seed(&[9; 32]).public_key();
        let aid = Aid::basic(&key);

        let strict = StaticResolver::new();
        assert!(strict.resolve(&aid).await.is_err());

        let lenient = StaticResolver::new().with_basic_self_resolution(true);
        assert_eq!(lenient.resolve(&aid).await.unwrap(), vec![key]);

        // Table entries win over self resolution.
        let other = Keypair::from_seed(&[8; 32]).public_key();
        lenient.insert(aid.clone(), vec![other]).unwrap();
        assert_eq!(lenient.resolve(&aid).await.unwrap(), vec![other]);
    }

    #[tokio::test]
    async fn test_remove_identity() {
        let resolver = StaticResolver::new();
        let aid = Aid::new("Eidentity");
        resolver
            .insert(aid.clone(), vec![Keypair::from_seed(&[1; 32]).public_key()])
            .unwrap();

        assert!(resolver.remove(&aid).unwrap());
        assert!(!resolver.remove(&aid).unwrap());
        assert!(resolver.resolve(&aid).await.is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let key = Keypair::from_seed(&[4; 32]).public_key();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Eidentity": ["{}"]}}"#, key.to_qb64()).unwrap();

        let resolver = StaticResolver::from_file(file.path()).unwrap();
        assert_eq!(resolver.len().unwrap(), 1);
        assert_eq!(
            resolver.resolve(&Aid::new("Eidentity")).await.unwrap(),
            vec![key]
        );
    }

    #[test]
    fn test_load_rejects_bad_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Eidentity": ["not-a-key"]}}"#).unwrap();

        let err = StaticResolver::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Identities { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = StaticResolver::from_file(Path::new("/nonexistent/identities.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[tokio::test]
    async fn test_poisoned_table_is_reported() {
        let resolver = StaticResolver::new();
        let aid = Aid::new("Eidentity");

        let poison = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = resolver.keys.write().unwrap();
            panic!("writer died holding the lock");
        }));
        assert!(poison.is_err());

        let key = Keypair::from_seed(&[1; 32]).public_key();
        assert!(matches!(
            resolver.insert(aid.clone(), vec![key]),
            Err(ResolveError::Unavailable(_))
        ));
        assert!(matches!(resolver.remove(&aid), Err(ResolveError::Unavailable(_))));
        assert!(matches!(resolver.len(), Err(ResolveError::Unavailable(_))));
        assert!(matches!(
            resolver.resolve(&aid).await,
            Err(ResolveError::Unavailable(_))
        ));
    }
}
