//! Resolution of ABI type strings into alloy `DynSolType`s.

use alloy_core::dyn_abi::DynSolType;
use chainlogs_core::DecodeFailure;

/// Parse a canonical Solidity type string. Anything alloy cannot resolve
/// (fixed-point types, malformed strings) is `UnsupportedType`.
pub fn resolve(ty: &str) -> Result<DynSolType, DecodeFailure> {
    DynSolType::parse(ty).map_err(|e| DecodeFailure::unsupported_type(ty, e))
}

/// Resolve a list of types, failing on the first unsupported one.
pub fn resolve_all(types: &[&str]) -> Result<Vec<DynSolType>, DecodeFailure> {
    types.iter().map(|t| resolve(t)).collect()
}

/// Reference types (string, bytes, arrays, tuples) are stored in an indexed
/// topic as the keccak256 of their encoding. The value is unrecoverable.
pub fn is_hashed_when_indexed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

/// Whether `ty` is encoded out of line (behind an offset in the head).
pub fn is_dynamic(ty: &DynSolType) -> bool {
    match ty {
        DynSolType::String | DynSolType::Bytes | DynSolType::Array(_) => true,
        DynSolType::FixedArray(inner, _) => is_dynamic(inner),
        DynSolType::Tuple(inner) => inner.iter().any(is_dynamic),
        _ => false,
    }
}

/// Number of 32-byte words `ty` occupies in the head of a tuple encoding,
/// or `None` if the count overflows `usize`.
pub fn head_words(ty: &DynSolType) -> Option<usize> {
    if is_dynamic(ty) {
        return Some(1);
    }
    match ty {
        DynSolType::FixedArray(inner, len) => head_words(inner)?.checked_mul(*len),
        DynSolType::Tuple(inner) => inner
            .iter()
            .try_fold(0usize, |acc, t| acc.checked_add(head_words(t)?)),
        _ => Some(1),
    }
}

/// Whether every fixed-size array nested anywhere in `ty` fits in `words`
/// words. A value of `ty` cannot be encoded in fewer.
pub fn fits_within(ty: &DynSolType, words: usize) -> bool {
    match ty {
        DynSolType::Array(inner) => fits_within(inner, words),
        DynSolType::FixedArray(inner, len) => {
            let element = if is_dynamic(inner) { Some(1) } else { head_words(inner) };
            element
                .and_then(|w| w.checked_mul(*len))
                .is_some_and(|w| w <= words)
                && fits_within(inner, words)
        }
        DynSolType::Tuple(inner) => inner.iter().all(|t| fits_within(t, words)),
        _ => true,
    }
}
