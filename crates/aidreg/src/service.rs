//! The registry service: register and read, independent of any HTTP stack.
//!
//! Both operations authenticate the caller with a `Signature` header over
//! the exact bytes the caller sent (the body for register, the raw query
//! string for read), and answer with the server's own signature over the
//! digest of what is returned.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use aidreg_core::signage::{self, Signage};
use aidreg_core::{
    check_signatures, digest, Aid, Ed25519PublicKey, Record, RecordList, Said,
};
use aidreg_store::{PutResult, Registry};

use crate::config::ServiceConfig;
use crate::error::{ResolveError, ServiceError};
use crate::resolver::KeyResolver;
use crate::signer::ResponseSigner;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// A response body together with the server's `Signature` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signed<T> {
    pub body: T,
    pub signature: String,
}

/// Body of a successful read: one record, or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReadBody {
    One(Record),
    Many(Vec<Record>),
}

impl ReadBody {
    pub fn records(&self) -> &[Record] {
        match self {
            ReadBody::One(record) => std::slice::from_ref(record),
            ReadBody::Many(records) => records,
        }
    }
}

/// Query selector, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Said(Said),
    Owner(Aid),
    Name(String),
}

impl Selector {
    pub const SAID_PARAM: &'static str = "SAID";
    pub const AID_PARAM: &'static str = "AID";
    pub const NAME_PARAM: &'static str = "name";

    /// Pick the selector from a raw query string.
    ///
    /// `SAID` wins over `AID`, which wins over `name`. Parameters with an
    /// empty value are ignored. When a parameter repeats, the first
    /// non-empty occurrence counts.
    pub fn from_query(query: &str) -> Option<Self> {
        let mut said = None;
        let mut owner = None;
        let mut name = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                Self::SAID_PARAM => &mut said,
                Self::AID_PARAM => &mut owner,
                Self::NAME_PARAM => &mut name,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        said.map(|s| Selector::Said(Said::new(s)))
            .or_else(|| owner.map(|o| Selector::Owner(Aid::new(o))))
            .or_else(|| name.map(Selector::Name))
    }
}

/// Register/read state machines over an injected registry, resolver and
/// signer.
#[derive(Clone)]
pub struct RegistryService {
    registry: Arc<dyn Registry>,
    resolver: Arc<dyn KeyResolver>,
    signer: Arc<dyn ResponseSigner>,
    config: ServiceConfig,
}

impl RegistryService {
    pub fn new(
        registry: Arc<dyn Registry>,
        resolver: Arc<dyn KeyResolver>,
        signer: Arc<dyn ResponseSigner>,
    ) -> Self {
        Self {
            registry,
            resolver,
            signer,
            config: ServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// The server's identifier.
    pub fn server_aid(&self) -> &Aid {
        self.signer.aid()
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Register
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a record.
    ///
    /// `body` is the raw request body and `signature` the raw `Signature`
    /// header value. On success the record is stored (or was already stored)
    /// and echoed back with the server's signature over its digest.
    pub async fn register(&self, body: &[u8], signature: Option<&[u8]>) -> Result<Signed<Record>> {
        let record = parse_record(body)?;

        let signature = present(signature).ok_or_else(|| {
            warn!(said = %record.said, "Register without signature");
            ServiceError::AuthenticationFailure("missing Signature header".into())
        })?;

        if !digest::verify(&record) {
            warn!(said = %record.said, owner = %record.owner, "Register with mismatched SAID");
            return Err(ServiceError::IntegrityFailure(format!(
                "SAID {} does not match record content",
                record.said
            )));
        }

        let keys = self.resolve(&record.owner).await?;
        let signature = std::str::from_utf8(signature).map_err(|_| {
            warn!(owner = %record.owner, "Register signature is not text");
            ServiceError::AuthenticationFailure("Signature header is not text".into())
        })?;
        check_signatures(signature, body, &keys).map_err(|e| {
            warn!(owner = %record.owner, error = %e, "Register signature rejected");
            ServiceError::AuthenticationFailure(format!("signature verification failed: {}", e))
        })?;
        debug!(owner = %record.owner, keys = keys.len(), "Register signature verified");

        match self.registry.put(&record).await? {
            PutResult::Inserted => {
                info!(said = %record.said, owner = %record.owner, name = %record.name, "Registered record")
            }
            PutResult::AlreadyExists => {
                debug!(said = %record.said, "Record already registered")
            }
        }

        let signature = self.sign(&record.said)?;
        Ok(Signed {
            body: record,
            signature,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read
    // ─────────────────────────────────────────────────────────────────────────

    /// Read records.
    ///
    /// `query` is the raw query string as sent, `signature` the raw
    /// `Signature` header value and `claimed` the optional `KERI-AID` header,
    /// consulted only when the signature bundle names no signer.
    pub async fn read(
        &self,
        query: Option<&str>,
        signature: Option<&[u8]>,
        claimed: Option<&[u8]>,
    ) -> Result<Signed<ReadBody>> {
        let signature = present(signature).ok_or_else(|| {
            warn!("Read without signature");
            ServiceError::AuthenticationFailure("missing Signature header".into())
        })?;
        let signature = std::str::from_utf8(signature).map_err(|_| {
            warn!("Read signature is not text");
            ServiceError::MalformedInput("malformed Signature header: not text".into())
        })?;

        let signer = claimed_signer(signature, claimed)?;

        let query = query.filter(|q| !q.is_empty()).ok_or_else(|| {
            ServiceError::MalformedInput("missing query string".into())
        })?;

        let keys = self.resolve(&signer).await?;
        check_signatures(signature, query.as_bytes(), &keys).map_err(|e| {
            warn!(aid = %signer, error = %e, "Read signature rejected");
            ServiceError::AuthenticationFailure(format!("signature verification failed: {}", e))
        })?;
        debug!(aid = %signer, keys = keys.len(), "Read signature verified");

        let selector = Selector::from_query(query).ok_or_else(|| {
            ServiceError::MalformedInput("query must name one of SAID, AID or name".into())
        })?;

        let mut records: Vec<Record> = match &selector {
            Selector::Said(said) => self.registry.get_by_digest(said).await?.into_iter().collect(),
            Selector::Owner(owner) => self.registry.get_by_owner(owner).await?,
            Selector::Name(name) => self.registry.get_by_name(name).await?,
        };

        let (body, said) = match records.len() {
            0 => {
                debug!(selector = ?selector, "Read matched nothing");
                return Err(ServiceError::NotFound("no matching records".into()));
            }
            1 => {
                let record = records.remove(0);
                let said = record.said.clone();
                (ReadBody::One(record), said)
            }
            _ => {
                let list = digest::saidify(RecordList::new(records))
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                (ReadBody::Many(list.data), list.said)
            }
        };

        info!(aid = %signer, selector = ?selector, matches = body.records().len(), "Read records");

        let signature = self.sign(&said)?;
        Ok(Signed { body, signature })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn resolve(&self, aid: &Aid) -> Result<Vec<Ed25519PublicKey>> {
        let resolved = tokio::time::timeout(self.config.resolve_timeout, self.resolver.resolve(aid))
            .await
            .map_err(|_| {
                warn!(aid = %aid, timeout = ?self.config.resolve_timeout, "Identity resolution timed out");
                ServiceError::AuthenticationFailure(format!("could not resolve {}", aid))
            })?;

        resolved.map_err(|e| {
            warn!(aid = %aid, error = %e, "Identity resolution failed");
            match e {
                ResolveError::UnknownIdentity(aid) => {
                    ServiceError::AuthenticationFailure(format!("unknown identity {}", aid))
                }
                ResolveError::Unavailable(_) => {
                    ServiceError::AuthenticationFailure(format!("could not resolve {}", aid))
                }
            }
        })
    }

    fn sign(&self, said: &Said) -> Result<String> {
        let signatures = self.signer.sign(said.as_bytes())?;
        let bundle = Signage::indexed(signatures)
            .map_err(crate::error::SignError::from)?
            .with_signer(self.signer.aid().clone());
        Ok(signage::encode(&[bundle]))
    }
}

/// Parse the register body, telling "not a JSON object" apart from
/// "missing fields" and from anything else wrong with the fields.
fn parse_record(body: &[u8]) -> Result<Record> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::MalformedInput(format!("body is not JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| ServiceError::MalformedInput("body is not a JSON object".into()))?;

    let missing: Vec<&str> = ["d", "i", "n"]
        .into_iter()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::MalformedInput(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| ServiceError::MalformedInput(format!("invalid record: {}", e)))
}

/// A header value that is missing or blank counts as absent.
fn present(value: Option<&[u8]>) -> Option<&[u8]> {
    value.filter(|v| !v.iter().all(u8::is_ascii_whitespace))
}

/// The identity a read claims to come from: the signer named in the first
/// bundle, else the `KERI-AID` header. A `KERI-AID` that is not text is
/// treated as absent.
fn claimed_signer(signature: &str, claimed: Option<&[u8]>) -> Result<Aid> {
    let bundles = signage::decode(signature).map_err(|e| {
        warn!(error = %e, "Undecodable Signature header");
        ServiceError::MalformedInput(format!("malformed Signature header: {}", e))
    })?;

    bundles
        .first()
        .and_then(Signage::signer)
        .cloned()
        .or_else(|| {
            claimed
                .and_then(|raw| std::str::from_utf8(raw).ok())
                .map(str::trim)
                .filter(|aid| !aid.is_empty())
                .map(Aid::new)
        })
        .ok_or_else(|| ServiceError::MalformedInput("no signer identified".into()))
}
