//! `AbiDecoder` — decodes one log against its registered event definition.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::B256;
use chainlogs_core::{
    AbiParameter, DecodeErrorKind, DecodeFailure, DecodeOutcome, DecodeSource, DecodedEvent,
    RawLog, RegisteredEvent, TypedValue,
};
use std::collections::HashSet;
use tracing::debug;

use crate::{abi_type, normalizer};

/// The ABI-driven EVM log decoder.
/// Stateless and cheap to clone; safe to share across worker threads.
#[derive(Debug, Default, Clone)]
pub struct AbiDecoder;

impl AbiDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode `log` with `event`. Failures become `DecodeOutcome::Error`.
    pub fn decode(&self, log: &RawLog, event: &RegisteredEvent) -> DecodeOutcome {
        match self.try_decode(log, event) {
            Ok(decoded) => DecodeOutcome::Decoded(decoded),
            Err(failure) => {
                debug!(
                    event = %event.signature,
                    tx = %log.transaction_hash,
                    log_index = log.log_index,
                    %failure,
                    "ABI decode failed"
                );
                DecodeOutcome::Error(failure)
            }
        }
    }

    /// Decode `log` with `event`, returning the failure as an `Err`.
    pub fn try_decode(
        &self,
        log: &RawLog,
        event: &RegisteredEvent,
    ) -> Result<DecodedEvent, DecodeFailure> {
        if let Some(hash) = log.signature_hash() {
            if hash != event.hash {
                return Err(DecodeFailure::new(
                    DecodeErrorKind::SignatureMismatch,
                    format!("topics[0] is {hash}, expected {} for {}", event.hash, event.signature),
                ));
            }
        }

        let def = &event.def;
        let indexed = def.indexed_inputs();
        let data_inputs = def.data_inputs();

        // Extra topics beyond the indexed count are ignored.
        let topics = log.indexed_topics();
        if topics.len() < indexed.len() {
            return Err(DecodeFailure::truncated_topics(indexed.len(), topics.len()));
        }

        let mut values: Vec<Option<TypedValue>> = vec![None; def.inputs.len()];

        for ((pos, param), topic) in indexed.iter().zip(topics) {
            values[*pos] = Some(decode_topic(topic, &param.ty)?);
        }

        let data_types: Vec<&str> = data_inputs.iter().map(|(_, p)| p.ty.as_str()).collect();
        let decoded = decode_data(&log.data, &data_types)?;
        for ((pos, _), value) in data_inputs.iter().zip(decoded) {
            values[*pos] = Some(value);
        }

        let fields = field_names(&def.inputs)
            .into_iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();

        Ok(DecodedEvent {
            event: def.name.clone(),
            signature: event.signature.clone(),
            fields,
            address: log.address,
            source: DecodeSource::Abi,
            log: log.clone(),
        })
    }
}

/// Decode a single indexed topic as `ty`.
///
/// # Indexed-parameter encoding rules
/// - **Value types** (uint, int, bool, address, bytes1–bytes32): padded to
///   32 bytes and stored directly, so the word decodes as the type.
/// - **Reference types** (string, bytes, arrays, tuples): stored as the
///   keccak256 of their encoding. The original value is unrecoverable and
///   the topic is returned as `DynamicBytesHash`.
pub fn decode_topic(topic: &B256, ty: &str) -> Result<TypedValue, DecodeFailure> {
    let sol_type = abi_type::resolve(ty)?;
    if abi_type::is_hashed_when_indexed(&sol_type) {
        return Ok(TypedValue::DynamicBytesHash(*topic));
    }
    sol_type
        .abi_decode(topic.as_slice())
        .map(normalizer::normalize)
        .map_err(|e| DecodeFailure::unsupported_type(ty, format!("topic decode: {e}")))
}

/// Decode the data payload as one ABI tuple of `types`, in order.
///
/// All-or-nothing: either every value decodes or the whole payload fails with
/// `DataLengthMismatch`. A fully static type list must match the payload
/// length exactly; a list with dynamic members must be word-aligned, cover
/// the head, and re-encode to exactly the payload length.
pub fn decode_data(data: &[u8], types: &[&str]) -> Result<Vec<TypedValue>, DecodeFailure> {
    let sol_types = abi_type::resolve_all(types)?;
    let signature = types.join(",");

    if sol_types.is_empty() {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        return Err(DecodeFailure::data_length(format!(
            "no data parameters declared, got {} bytes",
            data.len()
        )));
    }

    let words = data.len() / 32;
    let head = sol_types
        .iter()
        .try_fold(0usize, |acc, t| acc.checked_add(abi_type::head_words(t)?))
        .and_then(|w| w.checked_mul(32))
        .filter(|_| sol_types.iter().all(|t| abi_type::fits_within(t, words)));
    let Some(head) = head else {
        return Err(DecodeFailure::data_length(format!(
            "({signature}) does not fit in a {}-byte payload",
            data.len()
        )));
    };
    let dynamic = sol_types.iter().any(abi_type::is_dynamic);

    if !dynamic && data.len() != head {
        return Err(DecodeFailure::data_length(format!(
            "({signature}) requires {head} bytes, got {}",
            data.len()
        )));
    }
    if dynamic && (data.len() < head || data.len() % 32 != 0) {
        return Err(DecodeFailure::data_length(format!(
            "({signature}) requires a word-aligned payload of at least {head} bytes, got {}",
            data.len()
        )));
    }

    let tuple = DynSolType::Tuple(sol_types);
    let decoded = tuple
        .abi_decode_params(data)
        .map_err(|e| DecodeFailure::data_length(format!("({signature}): {e}")))?;

    if dynamic {
        let consumed = decoded.abi_encode_params().len();
        if consumed != data.len() {
            return Err(DecodeFailure::data_length(format!(
                "({signature}) decoded {consumed} bytes of a {}-byte payload",
                data.len()
            )));
        }
    }

    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };
    Ok(values.into_iter().map(normalizer::normalize).collect())
}

/// Field names in declaration order.
///
/// An empty name, or one that repeats an earlier field, is replaced by
/// `paramN`, where N counts such parameters from 1. Synthesized names skip
/// any `paramN` the ABI already declares.
pub fn field_names(inputs: &[AbiParameter]) -> Vec<String> {
    let declared: HashSet<&str> = inputs
        .iter()
        .map(|p| p.name.as_str())
        .filter(|n| !n.is_empty())
        .collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(inputs.len());
    let mut synthesized = 0usize;

    inputs
        .iter()
        .map(|p| {
            if !p.name.is_empty() && seen.insert(p.name.clone()) {
                return p.name.clone();
            }
            loop {
                synthesized += 1;
                let candidate = format!("param{synthesized}");
                if !declared.contains(candidate.as_str()) && seen.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}
