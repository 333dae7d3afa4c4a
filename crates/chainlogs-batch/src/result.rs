//! Output of one scheduler run.

use alloy_primitives::B256;
use chainlogs_core::{DecodeOutcome, RawLog};
use indexmap::IndexMap;
use serde::Serialize;

/// Per-run counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total_input: usize,
    /// Size of every chunk the input was split into, in order
    pub chunk_sizes: Vec<usize>,
    pub chunks_processed: usize,
    /// Decoded from a registered ABI
    pub decoded: usize,
    /// Decoded from a learned signature only
    pub heuristic: usize,
    pub unknown: usize,
    /// Unknown outcomes that carry a decode failure
    pub failed: usize,
    pub cancelled: bool,
}

/// Transaction-grouped outcomes.
///
/// Transactions appear in the order their first log appeared in the input;
/// each transaction's outcomes are ordered by log index.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub by_transaction: IndexMap<B256, Vec<DecodeOutcome>>,
    /// Logs that resolved to `UnknownEvent`, in input order
    pub unknown: Vec<RawLog>,
    /// Logs of chunks skipped after cancellation, in input order
    pub undecoded: Vec<RawLog>,
    pub stats: BatchStats,
}

impl BatchResult {
    /// Number of outcomes across all transactions.
    pub fn outcome_count(&self) -> usize {
        self.by_transaction.values().map(Vec::len).sum()
    }

    pub fn transaction(&self, tx_hash: &B256) -> Option<&[DecodeOutcome]> {
        self.by_transaction.get(tx_hash).map(Vec::as_slice)
    }

    /// Every outcome, transaction by transaction.
    pub fn outcomes(&self) -> impl Iterator<Item = &DecodeOutcome> {
        self.by_transaction.values().flatten()
    }
}
