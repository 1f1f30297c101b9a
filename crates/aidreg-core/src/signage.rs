//! `Signature` header codec.
//!
//! A header carries one or more signature bundles separated by `,`. Each
//! bundle is a `;`-separated list of `key="value"` items:
//!
//! ```text
//! indexed="?1";signer="B...";0="AA...";1="AB..."
//! ```
//!
//! - `indexed` (required) is `?1` when the numeric tags index the signer's
//!   key list, `?0` otherwise.
//! - `signer` (optional) names the signing identity.
//! - `ordinal`, `digest` and `kind` are optional; `kind` must be `CESR`.
//! - Every other item is a numeric tag mapping to a qualified signature. For
//!   indexed bundles the index embedded in the signature code must equal the
//!   tag.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::crypto::Ed25519Signature;
use crate::error::HeaderError;
use crate::types::Aid;

/// HTTP header name carrying signature bundles.
pub const SIGNATURE_HEADER: &str = "Signature";

/// Largest number of signatures one bundle can carry.
pub const MAX_SIGNATURES: usize = 64;

const INDEXED: &str = "indexed";
const SIGNER: &str = "signer";
const ORDINAL: &str = "ordinal";
const DIGEST: &str = "digest";
const KIND: &str = "kind";
const KIND_CESR: &str = "CESR";

/// One decoded signature bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signage {
    indexed: bool,
    signer: Option<Aid>,
    ordinal: Option<String>,
    digest: Option<String>,
    markers: BTreeMap<u8, Ed25519Signature>,
}

impl Signage {
    /// An indexed bundle: signature `i` is tagged with index `i`.
    pub fn indexed(
        signatures: impl IntoIterator<Item = Ed25519Signature>,
    ) -> Result<Self, HeaderError> {
        let signatures: Vec<_> = signatures.into_iter().collect();
        if signatures.len() > MAX_SIGNATURES {
            return Err(HeaderError::TooManySignatures(signatures.len()));
        }

        let markers = signatures
            .into_iter()
            .enumerate()
            .map(|(i, sig)| (i as u8, sig))
            .collect();

        Ok(Self {
            indexed: true,
            signer: None,
            ordinal: None,
            digest: None,
            markers,
        })
    }

    /// Embed the signer's identifier.
    pub fn with_signer(mut self, signer: Aid) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn signer(&self) -> Option<&Aid> {
        self.signer.as_ref()
    }

    pub fn ordinal(&self) -> Option<&str> {
        self.ordinal.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Signature at `index`, if present.
    pub fn marker(&self, index: u8) -> Option<&Ed25519Signature> {
        self.markers.get(&index)
    }

    /// All signatures by tag, ascending.
    pub fn markers(&self) -> &BTreeMap<u8, Ed25519Signature> {
        &self.markers
    }

    fn encode_to(&self, out: &mut String) {
        let flag = if self.indexed { "?1" } else { "?0" };
        push_item(out, INDEXED, flag);
        if let Some(signer) = &self.signer {
            push_item(out, SIGNER, signer.as_str());
        }
        if let Some(ordinal) = &self.ordinal {
            push_item(out, ORDINAL, ordinal);
        }
        if let Some(digest) = &self.digest {
            push_item(out, DIGEST, digest);
        }
        for (tag, sig) in &self.markers {
            let text = if self.indexed {
                // Tags are below MAX_SIGNATURES by construction.
                sig.to_indexed_qb64(*tag).unwrap_or_default()
            } else {
                sig.to_qb64()
            };
            push_item(out, &tag.to_string(), &text);
        }
    }
}

fn push_item(out: &mut String, key: &str, value: &str) {
    if !out.is_empty() && !out.ends_with(',') {
        out.push(';');
    }
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
}

/// Encode bundles into a single header value.
pub fn encode(bundles: &[Signage]) -> String {
    let mut out = String::new();
    for (i, bundle) in bundles.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        bundle.encode_to(&mut out);
    }
    out
}

/// Decode a header value into its bundles.
pub fn decode(header: &str) -> Result<Vec<Signage>, HeaderError> {
    let compact: String = header.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(HeaderError::Empty);
    }

    compact.split(',').map(decode_bundle).collect()
}

fn decode_bundle(bundle: &str) -> Result<Signage, HeaderError> {
    if bundle.is_empty() {
        return Err(HeaderError::EmptyBundle);
    }

    let mut items: BTreeMap<&str, &str> = BTreeMap::new();
    for item in bundle.split(';') {
        let (key, raw) = item
            .split_once('=')
            .ok_or_else(|| HeaderError::MalformedItem(item.to_owned()))?;
        if key.is_empty() {
            return Err(HeaderError::MalformedItem(item.to_owned()));
        }
        let value = raw
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .ok_or_else(|| HeaderError::UnquotedValue(key.to_owned()))?;
        if items.insert(key, value).is_some() {
            return Err(HeaderError::DuplicateTag(key.to_owned()));
        }
    }

    let indexed = match items.remove(INDEXED) {
        Some("?1") => true,
        Some("?0") => false,
        Some(other) => return Err(HeaderError::InvalidIndexed(other.to_owned())),
        None => return Err(HeaderError::MissingIndexed),
    };
    let signer = items.remove(SIGNER).map(Aid::from);
    let ordinal = items.remove(ORDINAL).map(str::to_owned);
    let digest = items.remove(DIGEST).map(str::to_owned);
    if let Some(kind) = items.remove(KIND) {
        if kind != KIND_CESR {
            return Err(HeaderError::UnsupportedKind(kind.to_owned()));
        }
    }

    let mut markers = BTreeMap::new();
    for (key, value) in items {
        let tag = parse_tag(key)?;
        let (sig, embedded) =
            Ed25519Signature::from_qb64(value).map_err(|e| HeaderError::InvalidSignature {
                tag,
                reason: e.to_string(),
            })?;

        match (indexed, embedded) {
            (true, Some(embedded)) if embedded != tag => {
                return Err(HeaderError::IndexMismatch { tag, embedded });
            }
            (true, None) | (false, Some(_)) => {
                return Err(HeaderError::InvalidSignature {
                    tag,
                    reason: "signature code does not match the indexed flag".into(),
                });
            }
            _ => {}
        }

        // Tags are normalized, so "01" and "1" collide here.
        match markers.entry(tag) {
            Entry::Vacant(slot) => {
                slot.insert(sig);
            }
            Entry::Occupied(_) => return Err(HeaderError::DuplicateTag(key.to_owned())),
        }
    }

    if markers.is_empty() {
        return Err(HeaderError::NoSignatures);
    }

    Ok(Signage {
        indexed,
        signer,
        ordinal,
        digest,
        markers,
    })
}

fn parse_tag(key: &str) -> Result<u8, HeaderError> {
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HeaderError::NonNumericTag(key.to_owned()));
    }
    key.parse::<u8>()
        .ok()
        .filter(|tag| usize::from(*tag) < MAX_SIGNATURES)
        .ok_or_else(|| HeaderError::TagOutOfRange(key.to_owned()))
}
