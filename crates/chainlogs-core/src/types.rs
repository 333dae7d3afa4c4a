//! Decoded value representation.
//!
//! Every decoded field is a `TypedValue`. The set is closed: consumers match
//! on it exhaustively instead of probing an untyped map.

use alloy_primitives::{Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded, typed field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    /// 20-byte EVM address
    Address(Address),
    /// Unsigned integer of the declared bit width
    UnsignedInt { bits: u16, value: U256 },
    /// Signed integer of the declared bit width
    Int { bits: u16, value: I256 },
    Bool(bool),
    /// `bytesN`; the payload is N bytes long
    FixedBytes(Bytes),
    /// An indexed string/bytes/array/tuple: only its keccak256 digest is on chain
    DynamicBytesHash(B256),
    /// Dynamic `bytes` from the data payload
    Bytes(Bytes),
    String(String),
    Array(Vec<TypedValue>),
    Tuple(Vec<TypedValue>),
    /// Undecoded word(s); produced by the heuristic path
    RawHex(Bytes),
}

impl TypedValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            TypedValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_u256(&self) -> Option<U256> {
        match self {
            TypedValue::UnsignedInt { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short type label, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Address(_) => "address",
            TypedValue::UnsignedInt { .. } => "uint",
            TypedValue::Int { .. } => "int",
            TypedValue::Bool(_) => "bool",
            TypedValue::FixedBytes(_) => "fixed_bytes",
            TypedValue::DynamicBytesHash(_) => "dynamic_bytes_hash",
            TypedValue::Bytes(_) => "bytes",
            TypedValue::String(_) => "string",
            TypedValue::Array(_) => "array",
            TypedValue::Tuple(_) => "tuple",
            TypedValue::RawHex(_) => "raw_hex",
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Address(a) => write!(f, "{a}"),
            TypedValue::UnsignedInt { value, .. } => write!(f, "{value}"),
            TypedValue::Int { value, .. } => write!(f, "{value}"),
            TypedValue::Bool(b) => write!(f, "{b}"),
            TypedValue::FixedBytes(b) | TypedValue::Bytes(b) | TypedValue::RawHex(b) => {
                write!(f, "0x{}", hex::encode(b))
            }
            TypedValue::DynamicBytesHash(h) => write!(f, "hash({h})"),
            TypedValue::String(s) => write!(f, "{s}"),
            TypedValue::Array(v) | TypedValue::Tuple(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                if matches!(self, TypedValue::Array(_)) {
                    write!(f, "[{}]", parts.join(", "))
                } else {
                    write!(f, "({})", parts.join(", "))
                }
            }
        }
    }
}
