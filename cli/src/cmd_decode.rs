//! `chainlogs decode` — decode a log file through the batch scheduler.
//!
//! Log file format (JSON array):
//! ```json
//! [{
//!   "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
//!   "topics": ["0xddf252ad...", "0x000...from", "0x000...to"],
//!   "data": "0x000...value",
//!   "transactionHash": "0xabc...",
//!   "logIndex": 4,
//!   "blockNumber": 19000000
//! }]
//! ```

use crate::abi_dir::DirAbiSource;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use chainlogs_batch::{BatchResult, BatchScheduler, SchedulerConfig};
use chainlogs_core::{CacheConfig, DecodeOutcome, RawLog};
use chainlogs_observability::DecodeMetrics;
use chainlogs_registry::{ingest_from_source, CachedAbiSource, SignatureRegistry};
use serde_json::json;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tracing::info;

pub struct DecodeArgs<'a> {
    pub logs: &'a Path,
    pub abi: &'a [PathBuf],
    pub abi_dir: Option<&'a Path>,
    pub signatures: Option<&'a Path>,
    pub scheduler: SchedulerConfig,
    pub cache: CacheConfig,
    pub json: bool,
}

pub async fn run(args: DecodeArgs<'_>) -> Result<()> {
    let text = std::fs::read_to_string(args.logs)
        .with_context(|| format!("reading logs '{}'", args.logs.display()))?;
    let logs: Vec<RawLog> = serde_json::from_str(&text)
        .with_context(|| format!("parsing logs '{}'", args.logs.display()))?;

    let registry = SignatureRegistry::new();
    crate::load_abi_files(&registry, args.abi)?;

    if let Some(dir) = args.abi_dir {
        let source = CachedAbiSource::new(DirAbiSource::new(dir), &args.cache)?;
        let summary = ingest_from_source(&source, &registry, unique_addresses(&logs)).await;
        info!(
            registered = summary.registered,
            not_found = summary.not_found.len(),
            failed = summary.failed.len(),
            "loaded per-contract ABIs"
        );
    }

    if let Some(path) = args.signatures {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading signatures '{}'", path.display()))?;
        let learned = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter(|l| registry.learn_signature(l).is_some())
            .count();
        info!(learned, "learned signatures");
    }

    let scheduler = BatchScheduler::new(Arc::new(registry), args.scheduler)?;
    let metrics = DecodeMetrics::new(&opentelemetry::global::meter("chainlogs"));

    let started = Instant::now();
    let result = scheduler.process_transaction_logs(&logs);
    metrics.record_batch(&result, started.elapsed());

    if args.json {
        print_json(&result)
    } else {
        print_text(&result);
        Ok(())
    }
}

/// Emitting contracts in first-seen order.
fn unique_addresses(logs: &[RawLog]) -> Vec<Address> {
    let mut seen = HashSet::new();
    logs.iter()
        .map(|l| l.address)
        .filter(|a| seen.insert(*a))
        .collect()
}

fn print_json(result: &BatchResult) -> Result<()> {
    let transactions: Vec<_> = result
        .by_transaction
        .iter()
        .map(|(tx, outcomes)| json!({ "transactionHash": tx, "outcomes": outcomes }))
        .collect();
    let out = json!({
        "transactions": transactions,
        "unknownCount": result.unknown.len(),
        "stats": result.stats,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn print_text(result: &BatchResult) {
    for (tx, outcomes) in &result.by_transaction {
        println!("tx {tx}");
        for outcome in outcomes {
            match outcome {
                DecodeOutcome::Decoded(event) => {
                    let fields: Vec<String> = event
                        .fields
                        .iter()
                        .map(|(name, value)| format!("{name}={value}"))
                        .collect();
                    println!(
                        "  [{}] {} ({:?}) {}",
                        event.log.log_index,
                        event.event,
                        event.source,
                        fields.join(" ")
                    );
                }
                DecodeOutcome::Unknown(u) => match &u.failure {
                    Some(f) => println!("  [{}] unknown ({f})", u.log.log_index),
                    None => println!("  [{}] unknown {}", u.log.log_index, u.log.address),
                },
                DecodeOutcome::Error(f) => println!("  error: {f}"),
            }
        }
    }
    let s = &result.stats;
    println!();
    println!(
        "{} logs in {} chunks: {} decoded, {} heuristic, {} unknown ({} failed)",
        s.total_input,
        s.chunk_sizes.len(),
        s.decoded,
        s.heuristic,
        s.unknown,
        s.failed
    );
}
