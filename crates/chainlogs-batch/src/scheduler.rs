//! `BatchScheduler` — chunked, parallel decoding with an ordered merge.
//!
//! 1. Split the input into contiguous chunks of at most `chunk_size` logs.
//! 2. Decode chunks on a fixed-size Rayon pool. Workers only read the
//!    signature lookup; each produces a chunk-local output vector.
//! 3. Merge all chunk outputs in one serialized step: group by transaction
//!    hash, then order each group by log index (ties by input position).
//!
//! The merge never depends on which worker finished first.

use crate::{
    cancel::CancellationToken,
    config::SchedulerConfig,
    result::{BatchResult, BatchStats},
};
use alloy_primitives::B256;
use chainlogs_core::{
    ConfigError, DecodeOutcome, DecodeSource, RawLog, SignatureLookup, UnknownEvent,
};
use chainlogs_evm::{AbiDecoder, HeuristicDecoder};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::{ops::Range, sync::Arc, time::Instant};
use tracing::{info, trace, warn};

/// One decoded log with the keys the merge orders it by.
#[derive(Debug)]
pub struct ChunkEntry {
    /// Position in the input sequence
    pub position: usize,
    pub transaction_hash: B256,
    pub log_index: u64,
    pub outcome: DecodeOutcome,
}

/// Decoded outcomes of one chunk.
#[derive(Debug)]
pub struct ChunkOutput {
    pub index: usize,
    pub entries: Vec<ChunkEntry>,
}

/// Batch decode scheduler.
pub struct BatchScheduler {
    lookup: Arc<dyn SignatureLookup>,
    abi: AbiDecoder,
    heuristic: HeuristicDecoder,
    pool: rayon::ThreadPool,
    config: SchedulerConfig,
}

impl BatchScheduler {
    /// Build a scheduler with its own worker pool of `config.concurrency`
    /// threads.
    pub fn new(
        lookup: Arc<dyn SignatureLookup>,
        config: SchedulerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.concurrency)
            .thread_name(|i| format!("chainlogs-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;

        Ok(Self {
            heuristic: HeuristicDecoder::new(Arc::clone(&lookup)),
            lookup,
            abi: AbiDecoder::new(),
            pool,
            config,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Decode every log and group the outcomes by transaction.
    pub fn process_transaction_logs(&self, logs: &[RawLog]) -> BatchResult {
        self.process_with_cancel(logs, &CancellationToken::new())
    }

    /// Like `process_transaction_logs`, stopping at the next chunk boundary
    /// once `cancel` is set. Logs of skipped chunks are returned in
    /// `BatchResult::undecoded`.
    pub fn process_with_cancel(
        &self,
        logs: &[RawLog],
        cancel: &CancellationToken,
    ) -> BatchResult {
        let started = Instant::now();
        let ranges = partition(logs.len(), self.config.chunk_size);
        info!(
            "BatchScheduler: decoding {} logs in {} chunks (chunk_size={}, concurrency={})",
            logs.len(),
            ranges.len(),
            self.config.chunk_size,
            self.config.concurrency
        );

        let chunk_results: Vec<Option<ChunkOutput>> = self.pool.install(|| {
            ranges
                .par_iter()
                .enumerate()
                .map(|(index, range)| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    Some(self.decode_chunk(index, range.clone(), &logs[range.clone()]))
                })
                .collect()
        });

        let mut outputs = Vec::with_capacity(chunk_results.len());
        let mut undecoded = Vec::new();
        for (range, output) in ranges.iter().zip(chunk_results) {
            match output {
                Some(output) => outputs.push(output),
                None => undecoded.extend_from_slice(&logs[range.clone()]),
            }
        }

        let cancelled = !undecoded.is_empty();
        let mut result = merge(outputs);
        result.undecoded = undecoded;
        result.stats.total_input = logs.len();
        result.stats.chunk_sizes = ranges.iter().map(|r| r.len()).collect();
        result.stats.cancelled = cancelled;

        if cancelled {
            warn!(
                "BatchScheduler: cancelled after {} of {} chunks, {} logs undecoded",
                result.stats.chunks_processed,
                ranges.len(),
                result.undecoded.len()
            );
        }
        info!(
            "BatchScheduler: complete: {} decoded, {} heuristic, {} unknown in {:?}",
            result.stats.decoded,
            result.stats.heuristic,
            result.stats.unknown,
            started.elapsed()
        );
        result
    }

    /// Decode one log: registered ABI, else learned signature, else unknown.
    pub fn decode_log(&self, log: &RawLog) -> DecodeOutcome {
        let Some(hash) = log.signature_hash() else {
            return DecodeOutcome::Unknown(UnknownEvent::new(log.clone()));
        };

        match self.lookup.lookup(&hash) {
            Some(event) => match self.abi.try_decode(log, &event) {
                Ok(decoded) => DecodeOutcome::Decoded(decoded),
                Err(failure) => {
                    warn!(
                        event = %event.signature,
                        tx = %log.transaction_hash,
                        log_index = log.log_index,
                        %failure,
                        "log degraded to unknown event"
                    );
                    DecodeOutcome::Unknown(UnknownEvent::with_failure(log.clone(), failure))
                }
            },
            None => self.heuristic.decode(log),
        }
    }

    fn decode_chunk(&self, index: usize, range: Range<usize>, logs: &[RawLog]) -> ChunkOutput {
        trace!(chunk = index, len = logs.len(), "decoding chunk");
        let entries = range
            .zip(logs)
            .map(|(position, log)| ChunkEntry {
                position,
                transaction_hash: log.transaction_hash,
                log_index: log.log_index,
                outcome: self.decode_log(log),
            })
            .collect();
        ChunkOutput { index, entries }
    }
}

impl std::fmt::Debug for BatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Contiguous chunk ranges covering `0..len`; the last one may be shorter.
pub fn partition(len: usize, chunk_size: usize) -> Vec<Range<usize>> {
    if chunk_size == 0 {
        return Vec::new();
    }
    (0..len)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(len))
        .collect()
}

/// Combine chunk outputs, in any arrival order, into a `BatchResult`.
///
/// Counts and grouping are filled in; input-level stats (`total_input`,
/// `chunk_sizes`, `cancelled`) are left to the caller.
pub fn merge(outputs: Vec<ChunkOutput>) -> BatchResult {
    let mut stats = BatchStats {
        chunks_processed: outputs.len(),
        ..BatchStats::default()
    };

    let mut all: Vec<ChunkEntry> = outputs.into_iter().flat_map(|o| o.entries).collect();
    all.sort_unstable_by_key(|e| e.position);

    let mut by_transaction: IndexMap<B256, Vec<ChunkEntry>> = IndexMap::new();
    let mut unknown = Vec::new();

    for entry in all {
        match &entry.outcome {
            DecodeOutcome::Decoded(event) => match event.source {
                DecodeSource::Abi => stats.decoded += 1,
                DecodeSource::Heuristic => stats.heuristic += 1,
            },
            DecodeOutcome::Unknown(u) => {
                stats.unknown += 1;
                if u.failure.is_some() {
                    stats.failed += 1;
                }
                unknown.push(u.log.clone());
            }
            DecodeOutcome::Error(_) => stats.failed += 1,
        }
        by_transaction
            .entry(entry.transaction_hash)
            .or_default()
            .push(entry);
    }

    let by_transaction = by_transaction
        .into_iter()
        .map(|(tx, mut entries)| {
            entries.sort_by_key(|e| (e.log_index, e.position));
            (tx, entries.into_iter().map(|e| e.outcome).collect())
        })
        .collect();

    BatchResult {
        by_transaction,
        unknown,
        undecoded: Vec::new(),
        stats,
    }
}
