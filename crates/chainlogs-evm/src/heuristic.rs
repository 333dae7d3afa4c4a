//! `HeuristicDecoder` — best-effort decoding from a learned signature string.
//!
//! Used when a log's topics[0] has no registered event definition but its
//! canonical signature text is known. Parameter names and indexed flags are
//! not part of a signature, so this path is approximate:
//!
//! - leading types are paired with topics[1..]: `address` and `uintN` are
//!   interpreted, anything else is returned as `RawHex` of the topic
//! - remaining types are decoded from the data payload; if that fails each
//!   remaining field gets its 32-byte payload word as `RawHex`
//! - fields are named `param1`, `param2`, ...

use alloy_primitives::{Address, Bytes, B256, U256};
use chainlogs_core::{
    DecodeOutcome, DecodeSource, DecodedEvent, RawLog, SignatureLookup, TypedValue, UnknownEvent,
};
use std::sync::Arc;
use tracing::debug;

use crate::{decoder::decode_data, signature::parse_signature};

pub struct HeuristicDecoder {
    lookup: Arc<dyn SignatureLookup>,
}

impl HeuristicDecoder {
    pub fn new(lookup: Arc<dyn SignatureLookup>) -> Self {
        Self { lookup }
    }

    /// Decode `log` from its learned signature, or return it as `UnknownEvent`.
    pub fn decode(&self, log: &RawLog) -> DecodeOutcome {
        let decoded = log
            .signature_hash()
            .and_then(|hash| self.lookup.signature_text(&hash))
            .and_then(|text| decode_with_signature(log, &text));
        match decoded {
            Some(event) => DecodeOutcome::Decoded(event),
            None => DecodeOutcome::Unknown(UnknownEvent::new(log.clone())),
        }
    }
}

impl std::fmt::Debug for HeuristicDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicDecoder").finish_non_exhaustive()
    }
}

/// Decode `log` against a canonical signature string. `None` if the string
/// cannot be parsed.
pub fn decode_with_signature(log: &RawLog, signature: &str) -> Option<DecodedEvent> {
    let (name, types) = parse_signature(signature)?;

    let topics = log.indexed_topics();
    let from_topics = types.len().min(topics.len());

    let mut values: Vec<TypedValue> = types[..from_topics]
        .iter()
        .zip(topics)
        .map(|(ty, topic)| decode_topic_heuristic(ty, topic))
        .collect();

    let rest = &types[from_topics..];
    match decode_data(&log.data, rest) {
        Ok(decoded) => values.extend(decoded),
        Err(failure) => {
            debug!(
                signature,
                tx = %log.transaction_hash,
                log_index = log.log_index,
                %failure,
                "heuristic data decode failed, falling back to raw words"
            );
            values.extend((0..rest.len()).map(|i| TypedValue::RawHex(data_word(&log.data, i))));
        }
    }

    let fields = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (format!("param{}", i + 1), v))
        .collect();

    Some(DecodedEvent {
        event: name.to_string(),
        signature: signature.to_string(),
        fields,
        address: log.address,
        source: DecodeSource::Heuristic,
        log: log.clone(),
    })
}

/// Fixed topic rules: `address` → low 20 bytes of the word, `uintN` →
/// big-endian integer, everything else → raw hex.
fn decode_topic_heuristic(ty: &str, topic: &B256) -> TypedValue {
    if ty == "address" {
        return TypedValue::Address(Address::from_slice(&topic[12..]));
    }
    if let Some(bits) = uint_bits(ty) {
        return TypedValue::UnsignedInt {
            bits,
            value: U256::from_be_bytes(topic.0),
        };
    }
    TypedValue::RawHex(Bytes::copy_from_slice(topic.as_slice()))
}

/// `uint` → 256, `uintN` → N for N in 8..=256 step 8.
fn uint_bits(ty: &str) -> Option<u16> {
    let suffix = ty.strip_prefix("uint")?;
    if suffix.is_empty() {
        return Some(256);
    }
    let bits: u16 = suffix.parse().ok()?;
    (bits >= 8 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

/// The `index`-th 32-byte word of `data`; shorter (or empty) past the end.
fn data_word(data: &[u8], index: usize) -> Bytes {
    let start = (index * 32).min(data.len());
    let end = (start + 32).min(data.len());
    Bytes::copy_from_slice(&data[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::keccak256_signature;
    use alloy_core::dyn_abi::DynSolValue;
    use chainlogs_core::{EventSignatureHash, RegisteredEvent};
    use std::collections::HashMap;

    struct Learned(HashMap<EventSignatureHash, Arc<str>>);

    impl SignatureLookup for Learned {
        fn lookup(&self, _hash: &EventSignatureHash) -> Option<Arc<RegisteredEvent>> {
            None
        }

        fn signature_text(&self, hash: &EventSignatureHash) -> Option<Arc<str>> {
            self.0.get(hash).cloned()
        }
    }

    fn decoder_for(signatures: &[&str]) -> HeuristicDecoder {
        let map = signatures
            .iter()
            .map(|s| (keccak256_signature(s), Arc::<str>::from(*s)))
            .collect();
        HeuristicDecoder::new(Arc::new(Learned(map)))
    }

    fn log(topics: Vec<B256>, data: Vec<u8>) -> RawLog {
        RawLog {
            address: Address::repeat_byte(0xc0),
            topics,
            data: Bytes::from(data),
            transaction_hash: B256::repeat_byte(0x02),
            log_index: 4,
            block_number: Some(1),
        }
    }

    #[test]
    fn decodes_transfer_without_names() {
        let sig = "Transfer(address,address,uint256)";
        let dec = decoder_for(&[sig]);
        let from = Address::repeat_byte(0x11);
        let to = Address::repeat_byte(0x22);
        let data = U256::from(5u64).to_be_bytes::<32>().to_vec();
        let raw = log(
            vec![keccak256_signature(sig).0, from.into_word(), to.into_word()],
            data,
        );

        let event = dec.decode(&raw).as_decoded().cloned().unwrap();
        assert_eq!(event.event, "Transfer");
        assert_eq!(event.source, DecodeSource::Heuristic);
        assert_eq!(event.field_names(), vec!["param1", "param2", "param3"]);
        assert_eq!(event.field("param1").unwrap().as_address(), Some(from));
        assert_eq!(event.field("param2").unwrap().as_address(), Some(to));
        assert_eq!(event.field("param3").unwrap().as_u256(), Some(U256::from(5u64)));
    }

    #[test]
    fn address_rule_matches_abi_encoding() {
        let addr: Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        let encoded = DynSolValue::Address(addr).abi_encode();
        let topic = B256::from_slice(&encoded);
        assert_eq!(
            decode_topic_heuristic("address", &topic),
            TypedValue::Address(addr)
        );
    }

    #[test]
    fn other_topic_types_are_raw_hex() {
        let topic = B256::repeat_byte(0x01);
        assert_eq!(
            decode_topic_heuristic("bytes32", &topic),
            TypedValue::RawHex(Bytes::copy_from_slice(topic.as_slice()))
        );
        assert!(matches!(decode_topic_heuristic("int256", &topic), TypedValue::RawHex(_)));
        assert!(matches!(
            decode_topic_heuristic("uint64", &topic),
            TypedValue::UnsignedInt { bits: 64, .. }
        ));
    }

    #[test]
    fn data_failure_degrades_to_raw_words() {
        let sig = "Sync(uint112,uint112)";
        let dec = decoder_for(&[sig]);
        // 40 bytes: neither field decodes cleanly.
        let raw = log(vec![keccak256_signature(sig).0], vec![0xab; 40]);

        let event = dec.decode(&raw).as_decoded().cloned().unwrap();
        assert_eq!(event.fields.len(), 2);
        assert_eq!(event.fields[0].1, TypedValue::RawHex(Bytes::from(vec![0xab; 32])));
        assert_eq!(event.fields[1].1, TypedValue::RawHex(Bytes::from(vec![0xab; 8])));
    }

    #[test]
    fn unknown_hash_is_unknown_event() {
        let dec = decoder_for(&["Transfer(address,address,uint256)"]);
        let raw = log(vec![B256::repeat_byte(0x99)], vec![]);
        let outcome = dec.decode(&raw);
        let unknown = outcome.as_unknown().unwrap();
        assert_eq!(unknown.log, raw);
        assert!(unknown.failure.is_none());
    }

    #[test]
    fn no_topics_is_unknown_event() {
        let dec = decoder_for(&[]);
        let raw = log(vec![], vec![1, 2, 3]);
        assert!(dec.decode(&raw).as_unknown().is_some());
    }

    #[test]
    fn uint_bits_parsing() {
        assert_eq!(uint_bits("uint"), Some(256));
        assert_eq!(uint_bits("uint8"), Some(8));
        assert_eq!(uint_bits("uint7"), None);
        assert_eq!(uint_bits("uint256[]"), None);
        assert_eq!(uint_bits("int256"), None);
    }
}
