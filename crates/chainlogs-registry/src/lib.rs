//! # chainlogs-registry
//!
//! The event signature registry for ChainLogs.
//!
//! ## Contents
//! 1. **`SignatureRegistry`** — append-only `signature hash → event definition`
//!    map, plus learned signature strings for heuristic decoding. Thread-safe
//!    via `Arc<RwLock<Inner>>`; many readers, rare writers.
//! 2. **ABI ingestion** — turns contract ABI JSON into event definitions,
//!    skipping malformed items one at a time.
//! 3. **ABI sources** — the `AbiSource` collaborator trait and a
//!    `BoundedCache`-backed wrapper.
//!
//! The decoders see the registry through `chainlogs_core::SignatureLookup`.

pub mod ingest;
pub mod registry;
pub mod source;

pub use ingest::{parse_abi_json, parse_event_item};
pub use registry::{CollisionKind, CollisionRecord, RegistrationReport, SignatureRegistry};
pub use source::{
    ingest_from_source, AbiLookup, AbiSource, CachedAbiSource, IngestSummary, SourceError,
    StaticAbiSource,
};
