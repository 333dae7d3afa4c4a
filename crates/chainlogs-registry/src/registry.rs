//! `SignatureRegistry` — signature hash → event definition.
//!
//! Append-only for the process lifetime. The first definition registered for
//! a hash wins; later conflicting definitions are kept as `CollisionRecord`s.
//! Hashing and ABI parsing happen before the write lock is taken, so writers
//! hold it only for the map inserts.

use chainlogs_core::{
    AbiError, AbiEventDef, EventSignatureHash, RegisteredEvent, SignatureLookup,
};
use chainlogs_evm::signature::{event_signature_hash, keccak256_signature, parse_signature};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::{debug, info, warn};

use crate::ingest::parse_event_item;

/// Why a definition was not registered over an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    /// Two different canonical signatures produced the same hash.
    HashCollision,
    /// Same canonical signature, different indexed layout
    /// (e.g. ERC-20 vs ERC-721 `Transfer`).
    LayoutConflict,
}

/// A definition that was ignored because its hash was already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionRecord {
    pub hash: EventSignatureHash,
    pub kind: CollisionKind,
    /// Signature of the definition that was kept
    pub kept: String,
    pub ignored: AbiEventDef,
}

/// Result of one `register` call.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Hashes that were not in the registry before this call, in ABI order
    pub added: Vec<EventSignatureHash>,
    /// Items skipped as malformed
    pub skipped: Vec<AbiError>,
    /// Definitions ignored because their hash was already registered differently
    pub collisions: Vec<CollisionRecord>,
}

#[derive(Default)]
struct Inner {
    events: HashMap<EventSignatureHash, Arc<RegisteredEvent>>,
    /// Signature strings learned without a definition
    learned: HashMap<EventSignatureHash, Arc<str>>,
    collisions: Vec<CollisionRecord>,
}

/// Thread-safe signature registry. Cloning shares the same underlying map.
#[derive(Clone, Default)]
pub struct SignatureRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register every event item of a contract ABI.
    ///
    /// Non-event items are ignored; malformed event items are skipped one by
    /// one and reported. Registering the same event again is a no-op.
    pub fn register(&self, abi_items: &[Value]) -> RegistrationReport {
        let mut defs = Vec::new();
        let mut skipped = Vec::new();
        for (index, item) in abi_items.iter().enumerate() {
            match parse_event_item(index, item) {
                Ok(Some(def)) => defs.push(def),
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "skipping ABI item");
                    skipped.push(e);
                }
            }
        }

        let mut report = self.register_events(defs);
        report.skipped = skipped;
        report
    }

    /// Register already-built event definitions.
    pub fn register_events(
        &self,
        defs: impl IntoIterator<Item = AbiEventDef>,
    ) -> RegistrationReport {
        let prepared: Vec<RegisteredEvent> = defs
            .into_iter()
            .map(|def| RegisteredEvent {
                hash: event_signature_hash(&def),
                signature: def.canonical_signature(),
                def,
            })
            .collect();

        let mut report = RegistrationReport::default();
        let mut inner = self.write();
        for event in prepared {
            match inner.events.get(&event.hash) {
                None => {
                    report.added.push(event.hash);
                    inner.events.insert(event.hash, Arc::new(event));
                }
                Some(existing) => {
                    if let Some(record) = conflict(existing, event) {
                        warn!(
                            hash = %record.hash,
                            kept = %record.kept,
                            ignored = %record.ignored.canonical_signature(),
                            kind = ?record.kind,
                            "event signature already registered, keeping first definition"
                        );
                        report.collisions.push(record.clone());
                        inner.collisions.push(record);
                    }
                }
            }
        }
        drop(inner);

        if !report.added.is_empty() {
            info!(added = report.added.len(), "registered event definitions");
        }
        report
    }

    /// Learn a bare canonical signature string (no names, no indexed flags).
    ///
    /// Returns its hash, or `None` if the string is not `Name(types...)`.
    pub fn learn_signature(&self, signature: &str) -> Option<EventSignatureHash> {
        let (name, types) = parse_signature(signature)?;
        let canonical = format!("{name}({})", types.join(","));
        let hash = keccak256_signature(&canonical);
        self.write()
            .learned
            .entry(hash)
            .or_insert_with(|| Arc::from(canonical.as_str()));
        Some(hash)
    }

    /// Full definition for `hash`, with its canonical signature.
    pub fn lookup(&self, hash: &EventSignatureHash) -> Option<Arc<RegisteredEvent>> {
        self.read().events.get(hash).cloned()
    }

    /// Canonical signature for `hash`: the registered definition's, else a
    /// learned one.
    pub fn signature_text(&self, hash: &EventSignatureHash) -> Option<Arc<str>> {
        let inner = self.read();
        if let Some(event) = inner.events.get(hash) {
            return Some(Arc::from(event.signature.as_str()));
        }
        inner.learned.get(hash).cloned()
    }

    /// Whether `hash` is known at all (definition or learned signature).
    pub fn is_known(&self, hash: &EventSignatureHash) -> bool {
        let inner = self.read();
        inner.events.contains_key(hash) || inner.learned.contains_key(hash)
    }

    /// Number of registered event definitions.
    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of learned signature strings.
    pub fn learned_len(&self) -> usize {
        self.read().learned.len()
    }

    /// Every definition ignored so far, in registration order.
    pub fn collisions(&self) -> Vec<CollisionRecord> {
        self.read().collisions.clone()
    }

    /// All registered signatures, sorted.
    pub fn signatures(&self) -> Vec<String> {
        let mut sigs: Vec<String> = self
            .read()
            .events
            .values()
            .map(|e| e.signature.clone())
            .collect();
        sigs.sort();
        sigs
    }
}

impl std::fmt::Debug for SignatureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        f.debug_struct("SignatureRegistry")
            .field("events", &inner.events.len())
            .field("learned", &inner.learned.len())
            .field("collisions", &inner.collisions.len())
            .finish()
    }
}

impl SignatureLookup for SignatureRegistry {
    fn lookup(&self, hash: &EventSignatureHash) -> Option<Arc<RegisteredEvent>> {
        SignatureRegistry::lookup(self, hash)
    }

    fn signature_text(&self, hash: &EventSignatureHash) -> Option<Arc<str>> {
        SignatureRegistry::signature_text(self, hash)
    }
}

/// `None` when `incoming` is the same event as `existing` (parameter names
/// may differ).
fn conflict(existing: &RegisteredEvent, incoming: RegisteredEvent) -> Option<CollisionRecord> {
    let kind = if existing.signature != incoming.signature {
        CollisionKind::HashCollision
    } else {
        let same_layout = existing
            .def
            .inputs
            .iter()
            .zip(&incoming.def.inputs)
            .all(|(a, b)| a.indexed == b.indexed);
        if same_layout {
            return None;
        }
        CollisionKind::LayoutConflict
    };
    Some(CollisionRecord {
        hash: existing.hash,
        kind,
        kept: existing.signature.clone(),
        ignored: incoming.def,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use chainlogs_core::AbiParameter;
    use serde_json::json;
    use std::thread;

    fn erc20_abi() -> Vec<Value> {
        vec![
            json!({"type": "function", "name": "transfer", "inputs": []}),
            json!({"type": "event", "name": "Transfer", "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]}),
            json!({"type": "event", "name": "Approval", "inputs": [
                {"name": "owner", "type": "address", "indexed": true},
                {"name": "spender", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]}),
        ]
    }

    fn transfer_hash() -> EventSignatureHash {
        keccak256_signature("Transfer(address,address,uint256)")
    }

    #[test]
    fn register_and_lookup() {
        let reg = SignatureRegistry::new();
        let report = reg.register(&erc20_abi());
        assert_eq!(report.added.len(), 2);
        assert!(report.skipped.is_empty());

        let found = reg.lookup(&transfer_hash()).unwrap();
        assert_eq!(found.def.name, "Transfer");
        assert_eq!(found.signature, "Transfer(address,address,uint256)");
    }

    #[test]
    fn register_is_idempotent() {
        let reg = SignatureRegistry::new();
        reg.register(&erc20_abi());
        let again = reg.register(&erc20_abi());
        assert!(again.added.is_empty());
        assert!(again.collisions.is_empty());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn malformed_items_skipped_individually() {
        let mut abi = erc20_abi();
        abi.insert(1, json!({"type": "event", "name": "Broken"}));
        abi.push(json!({"type": "event", "inputs": []}));
        let reg = SignatureRegistry::new();
        let report = reg.register(&abi);
        assert_eq!(report.added.len(), 2);
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn renamed_parameters_are_the_same_event() {
        let reg = SignatureRegistry::new();
        reg.register(&erc20_abi());
        let weth = AbiEventDef::new(
            "Transfer",
            vec![
                AbiParameter::new("src", "address", true),
                AbiParameter::new("dst", "address", true),
                AbiParameter::new("wad", "uint256", false),
            ],
        );
        let report = reg.register_events([weth]);
        assert!(report.added.is_empty());
        assert!(report.collisions.is_empty());
        assert_eq!(reg.lookup(&transfer_hash()).unwrap().def.inputs[0].name, "from");
    }

    #[test]
    fn layout_conflict_keeps_first() {
        let reg = SignatureRegistry::new();
        reg.register(&erc20_abi());
        let erc721 = AbiEventDef::new(
            "Transfer",
            vec![
                AbiParameter::new("from", "address", true),
                AbiParameter::new("to", "address", true),
                AbiParameter::new("tokenId", "uint256", true),
            ],
        );
        let report = reg.register_events([erc721]);
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.collisions[0].kind, CollisionKind::LayoutConflict);
        assert!(!reg.lookup(&transfer_hash()).unwrap().def.inputs[2].indexed);
        assert_eq!(reg.collisions().len(), 1);
    }

    #[test]
    fn hash_collision_detected() {
        let first = RegisteredEvent {
            def: AbiEventDef::new("A", vec![]),
            signature: "A()".into(),
            hash: EventSignatureHash(B256::repeat_byte(1)),
        };
        let second = RegisteredEvent {
            def: AbiEventDef::new("B", vec![]),
            signature: "B()".into(),
            hash: first.hash,
        };
        let record = conflict(&first, second).unwrap();
        assert_eq!(record.kind, CollisionKind::HashCollision);
        assert_eq!(record.kept, "A()");
        assert_eq!(record.ignored.name, "B");
    }

    #[test]
    fn learned_signature_is_text_only() {
        let reg = SignatureRegistry::new();
        let hash = reg.learn_signature("Sync(uint112, uint112)").unwrap();
        assert_eq!(hash, keccak256_signature("Sync(uint112,uint112)"));
        assert!(reg.lookup(&hash).is_none());
        assert_eq!(reg.signature_text(&hash).as_deref(), Some("Sync(uint112,uint112)"));
        assert!(reg.is_known(&hash));
        assert!(reg.learn_signature("garbage").is_none());
    }

    #[test]
    fn concurrent_readers_and_writers() {
        let reg = SignatureRegistry::new();
        let hash = transfer_hash();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reg = reg.clone();
                thread::spawn(move || {
                    if i % 2 == 0 {
                        reg.register(&erc20_abi());
                    }
                    for _ in 0..100 {
                        let _ = reg.lookup(&hash);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(reg.len(), 2);
        assert!(reg.collisions().is_empty());
    }
}
