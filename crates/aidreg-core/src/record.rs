//! Record: the unit of storage and transport.
//!
//! A record binds a name to the identity that registered it. Its identifier
//! is the digest of its own content, so a record is immutable: changing any
//! field yields a different record.

use serde::{Deserialize, Serialize};

use crate::canonical::SelfAddressing;
use crate::digest;
use crate::error::CoreError;
use crate::types::{Aid, Said};

/// A registered (identifier, name) binding.
///
/// Wire form: `{"d": <digest>, "i": <owner>, "n": <name>}`. Fields are
/// serialized in this order, which the digest depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Self-addressing digest over `{d: "", i, n}`.
    #[serde(rename = "d")]
    pub said: Said,

    /// Identity that authored the record.
    #[serde(rename = "i")]
    pub owner: Aid,

    /// Registered name.
    #[serde(rename = "n")]
    pub name: String,
}

impl Record {
    /// Create a record and compute its digest.
    pub fn new(owner: Aid, name: impl Into<String>) -> Result<Self, CoreError> {
        digest::saidify(Self {
            said: Said::blank(),
            owner,
            name: name.into(),
        })
    }

    /// Whether the stated digest matches the content.
    pub fn verify_said(&self) -> bool {
        digest::verify(self)
    }
}

impl SelfAddressing for Record {
    fn said(&self) -> &Said {
        &self.said
    }

    fn set_said(&mut self, said: Said) {
        self.said = said;
    }
}

/// Wrapper used to give a sequence of records a single digest.
///
/// Wire form: `{"d": <digest>, "data": [<record>, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordList {
    #[serde(rename = "d")]
    pub said: Said,

    pub data: Vec<Record>,
}

impl RecordList {
    /// Wrap records with a blank digest.
    pub fn new(data: Vec<Record>) -> Self {
        Self {
            said: Said::blank(),
            data,
        }
    }
}

impl SelfAddressing for RecordList {
    fn said(&self) -> &Said {
        &self.said
    }

    fn set_said(&mut self, said: Said) {
        self.said = said;
    }
}
