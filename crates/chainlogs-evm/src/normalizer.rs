//! Converts alloy-core `DynSolValue` → ChainLogs `TypedValue`.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::Bytes;
use chainlogs_core::TypedValue;

/// Convert a decoded `DynSolValue` into a `TypedValue`.
pub fn normalize(val: DynSolValue) -> TypedValue {
    match val {
        DynSolValue::Bool(b) => TypedValue::Bool(b),

        DynSolValue::Int(value, bits) => TypedValue::Int {
            bits: bits as u16,
            value,
        },

        DynSolValue::Uint(value, bits) => TypedValue::UnsignedInt {
            bits: bits as u16,
            value,
        },

        // The word is left-aligned; only the first `size` bytes are the value.
        DynSolValue::FixedBytes(word, size) => {
            TypedValue::FixedBytes(Bytes::copy_from_slice(&word[..size.min(32)]))
        }

        DynSolValue::Bytes(b) => TypedValue::Bytes(Bytes::from(b)),

        DynSolValue::String(s) => TypedValue::String(s),

        DynSolValue::Address(a) => TypedValue::Address(a),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            TypedValue::Array(vals.into_iter().map(normalize).collect())
        }

        DynSolValue::Tuple(vals) => TypedValue::Tuple(vals.into_iter().map(normalize).collect()),

        // address ++ selector, 24 bytes
        DynSolValue::Function(f) => TypedValue::FixedBytes(Bytes::copy_from_slice(f.as_slice())),
    }
}
