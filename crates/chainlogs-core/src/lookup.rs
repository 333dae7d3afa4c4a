//! Read-only view of the signature registry used by the decoders.
//!
//! The concrete, thread-safe implementation lives in `chainlogs-registry`.

use crate::abi::AbiEventDef;
use crate::event::EventSignatureHash;
use std::sync::Arc;

/// An event definition together with its canonical signature and hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredEvent {
    pub def: AbiEventDef,
    /// `Name(type1,type2,...)`
    pub signature: String,
    pub hash: EventSignatureHash,
}

pub trait SignatureLookup: Send + Sync {
    /// Full event definition registered from an ABI.
    fn lookup(&self, hash: &EventSignatureHash) -> Option<Arc<RegisteredEvent>>;

    /// Canonical signature string known for `hash`, with or without a definition.
    fn signature_text(&self, hash: &EventSignatureHash) -> Option<Arc<str>>;
}
