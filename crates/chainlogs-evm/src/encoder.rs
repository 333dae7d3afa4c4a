//! Log encoder — the inverse of `AbiDecoder`.
//!
//! Builds the topics and data payload a contract would emit for an event.
//! Used to produce synthetic logs for fixtures, benchmarks and the CLI.
//!
//! # Usage
//! ```ignore
//! let encoded = encode_log(&transfer_def, &[
//!     DynSolValue::Address(from),
//!     DynSolValue::Address(to),
//!     DynSolValue::Uint(U256::from(1_000), 256),
//! ])?;
//! let log = encoded.into_raw_log(token, tx_hash, 0);
//! ```

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, Bytes, B256};
use chainlogs_core::{AbiEventDef, RawLog};
use thiserror::Error;

use crate::{abi_type, signature};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("argument count mismatch: event has {expected} inputs, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("value for '{name}' does not match type {ty}")]
    TypeMismatch { name: String, ty: String },

    #[error("cannot encode '{name}': {reason}")]
    Unsupported { name: String, reason: String },
}

/// Topics and data for one event emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLog {
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl EncodedLog {
    pub fn into_raw_log(self, address: Address, transaction_hash: B256, log_index: u64) -> RawLog {
        RawLog {
            address,
            topics: self.topics,
            data: self.data,
            transaction_hash,
            log_index,
            block_number: None,
        }
    }
}

/// Encode `values` (one per input, in declaration order) as a log of `def`.
///
/// Indexed `string`/`bytes` values are hashed exactly as the EVM does.
/// Indexed arrays and tuples are rejected.
pub fn encode_log(def: &AbiEventDef, values: &[DynSolValue]) -> Result<EncodedLog, EncodeError> {
    if values.len() != def.inputs.len() {
        return Err(EncodeError::ArityMismatch {
            expected: def.inputs.len(),
            got: values.len(),
        });
    }

    let mut topics = vec![signature::event_signature_hash(def).0];
    let mut data_values = Vec::new();

    for (param, value) in def.inputs.iter().zip(values) {
        let sol_type = abi_type::resolve(&param.ty).map_err(|f| EncodeError::Unsupported {
            name: param.name.clone(),
            reason: f.context,
        })?;
        if !sol_type.matches(value) {
            return Err(EncodeError::TypeMismatch {
                name: param.name.clone(),
                ty: param.ty.clone(),
            });
        }

        if !param.indexed {
            data_values.push(value.clone());
            continue;
        }

        let topic = match sol_type {
            DynSolType::String | DynSolType::Bytes => {
                signature::keccak256(&value.abi_encode_packed())
            }
            ref t if abi_type::is_hashed_when_indexed(t) => {
                return Err(EncodeError::Unsupported {
                    name: param.name.clone(),
                    reason: format!("indexed {} values are not supported", param.ty),
                });
            }
            _ => B256::from_slice(&value.abi_encode()),
        };
        topics.push(topic);
    }

    let data = if data_values.is_empty() {
        Bytes::new()
    } else {
        Bytes::from(DynSolValue::Tuple(data_values).abi_encode_params())
    };

    Ok(EncodedLog { topics, data })
}
