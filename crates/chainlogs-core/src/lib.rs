//! # chainlogs-core
//!
//! Data model, error taxonomy and shared utilities for ChainLogs.
//! The EVM decoders, the signature registry and the batch scheduler are all
//! built on the types defined here.

pub mod abi;
pub mod cache;
pub mod error;
pub mod event;
pub mod lookup;
pub mod types;

pub use abi::{AbiEventDef, AbiParameter};
pub use cache::{BoundedCache, CacheConfig};
pub use error::{AbiError, ConfigError, DecodeErrorKind, DecodeFailure};
pub use event::{
    DecodeOutcome, DecodeSource, DecodedEvent, EventSignatureHash, RawLog, UnknownEvent,
};
pub use lookup::{RegisteredEvent, SignatureLookup};
pub use types::TypedValue;
