//! # chainlogs-batch
//!
//! Chunked, parallel decoding of large log sets.
//!
//! ## Features
//! - Contiguous chunks of at most `chunk_size` logs (default 1,000)
//! - Fixed-size Rayon worker pool (`concurrency` threads)
//! - Per-log routing: registered ABI → `AbiDecoder`, learned signature →
//!   `HeuristicDecoder`, otherwise `UnknownEvent`
//! - Single serialized merge grouping outcomes by transaction, ordered by
//!   log index
//! - Cancellation at chunk granularity
//!
//! ## Usage
//! ```no_run
//! use chainlogs_batch::{BatchScheduler, SchedulerConfig};
//! use chainlogs_core::RawLog;
//! use chainlogs_registry::{parse_abi_json, SignatureRegistry};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SignatureRegistry::new();
//! registry.register(&parse_abi_json(&std::fs::read_to_string("erc20.json")?)?);
//!
//! let logs: Vec<RawLog> = serde_json::from_str(&std::fs::read_to_string("logs.json")?)?;
//! let scheduler = BatchScheduler::new(Arc::new(registry), SchedulerConfig::default())?;
//! let result = scheduler.process_transaction_logs(&logs);
//!
//! for (tx, outcomes) in &result.by_transaction {
//!     println!("{tx}: {} logs", outcomes.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod config;
pub mod result;
pub mod scheduler;

pub use cancel::CancellationToken;
pub use config::SchedulerConfig;
pub use result::{BatchResult, BatchStats};
pub use scheduler::{merge, partition, BatchScheduler, ChunkEntry, ChunkOutput};
