//! EVM event signature hashing.
//!
//! The signature hash of an event is the keccak256 of its canonical
//! signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! For raw logs, topics[0] IS the hash, so it is never recomputed.

use alloy_primitives::B256;
use chainlogs_core::{AbiEventDef, EventSignatureHash};
use tiny_keccak::{Hasher, Keccak};

/// keccak256 (the original Keccak padding, not NIST SHA3-256).
pub fn keccak256(bytes: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Hash a canonical signature string: `"EventName(type1,type2,...)"`.
pub fn keccak256_signature(signature: &str) -> EventSignatureHash {
    EventSignatureHash(keccak256(signature.as_bytes()))
}

/// Hash of an event definition's canonical signature.
pub fn event_signature_hash(def: &AbiEventDef) -> EventSignatureHash {
    keccak256_signature(&def.canonical_signature())
}

/// Split `Name(t1,t2,...)` into its name and top-level parameter types.
///
/// Commas nested inside tuple types do not split. Returns `None` when the
/// string has no name or unbalanced parentheses.
pub fn parse_signature(signature: &str) -> Option<(&str, Vec<&str>)> {
    let signature = signature.trim();
    let open = signature.find('(')?;
    let name = signature[..open].trim();
    if name.is_empty() || !signature.ends_with(')') {
        return None;
    }
    let inner = &signature[open + 1..signature.len() - 1];

    let mut types = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                types.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        types.push(last);
    } else if !types.is_empty() {
        // trailing comma
        return None;
    }
    if types.iter().any(|t| t.is_empty()) {
        return None;
    }
    Some((name, types))
}
