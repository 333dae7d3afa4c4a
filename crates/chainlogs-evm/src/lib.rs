//! # chainlogs-evm
//!
//! EVM event-log decoding.
//!
//! ## Implementation notes
//! - Uses `alloy-core` dyn-abi for word-level ABI decoding
//! - topics[0] → keccak256 of the canonical event signature
//! - topics[1..] → indexed parameters (each one 32-byte word)
//! - `data` → non-indexed parameters, decoded as one ABI tuple
//! - Indexed string/bytes/array/tuple values are stored on chain as a hash
//!   and surface as `TypedValue::DynamicBytesHash`

pub mod abi_type;
pub mod decoder;
pub mod encoder;
pub mod heuristic;
pub mod normalizer;
pub mod signature;

pub use decoder::{decode_data, AbiDecoder};
pub use encoder::{encode_log, EncodeError, EncodedLog};
pub use heuristic::HeuristicDecoder;
pub use signature::{event_signature_hash, keccak256_signature, parse_signature};
