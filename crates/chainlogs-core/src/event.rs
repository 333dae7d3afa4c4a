//! Raw logs, decoded events and per-log outcomes.

use crate::error::DecodeFailure;
use crate::types::TypedValue;
use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// keccak256 of an event's canonical signature. The sole registry lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSignatureHash(pub B256);

impl EventSignatureHash {
    pub fn new(bytes: B256) -> Self {
        Self(bytes)
    }

    pub fn as_b256(&self) -> &B256 {
        &self.0
    }
}

impl From<B256> for EventSignatureHash {
    fn from(b: B256) -> Self {
        Self(b)
    }
}

impl fmt::Display for EventSignatureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw, undecoded EVM log as delivered by an RPC node or log loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    /// Contract that emitted the log
    pub address: Address,
    /// topics[0] is the event signature hash (non-anonymous events);
    /// topics[1..] carry indexed parameters
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed parameters
    #[serde(default)]
    pub data: Bytes,
    pub transaction_hash: B256,
    /// Position of the log; defines order within its transaction
    pub log_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl RawLog {
    /// topics[0] as a signature hash, if present.
    pub fn signature_hash(&self) -> Option<EventSignatureHash> {
        self.topics.first().copied().map(EventSignatureHash)
    }

    /// topics[1..]; empty when there are no topics.
    pub fn indexed_topics(&self) -> &[B256] {
        self.topics.get(1..).unwrap_or(&[])
    }
}

/// Which decoder produced a `DecodedEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeSource {
    /// Full event definition from a registered ABI
    Abi,
    /// Learned signature string only; field names are synthesized
    Heuristic,
}

/// A fully decoded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// Event name, e.g. "Transfer"
    pub event: String,
    /// Canonical signature that matched topics[0]
    pub signature: String,
    /// Decoded fields in declaration order
    pub fields: Vec<(String, TypedValue)>,
    /// Contract that emitted the log
    pub address: Address,
    pub source: DecodeSource,
    /// The originating log
    pub log: RawLog,
}

impl DecodedEvent {
    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }
}

/// A log no decoder could interpret, carried through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownEvent {
    pub log: RawLog,
    /// Present when a decoder matched the signature but then failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<DecodeFailure>,
}

impl UnknownEvent {
    pub fn new(log: RawLog) -> Self {
        Self { log, failure: None }
    }

    pub fn with_failure(log: RawLog, failure: DecodeFailure) -> Self {
        Self {
            log,
            failure: Some(failure),
        }
    }
}

/// The result for exactly one input log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecodeOutcome {
    Decoded(DecodedEvent),
    Unknown(UnknownEvent),
    Error(DecodeFailure),
}

impl DecodeOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeOutcome::Decoded(_))
    }

    pub fn as_decoded(&self) -> Option<&DecodedEvent> {
        match self {
            DecodeOutcome::Decoded(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&UnknownEvent> {
        match self {
            DecodeOutcome::Unknown(u) => Some(u),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&DecodeFailure> {
        match self {
            DecodeOutcome::Error(f) => Some(f),
            DecodeOutcome::Unknown(u) => u.failure.as_ref(),
            DecodeOutcome::Decoded(_) => None,
        }
    }
}
