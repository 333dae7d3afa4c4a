//! # chainlogs-observability
//!
//! Metrics and logging for ChainLogs.
//!
//! ## Built-in metrics
//! - `chainlogs.events_decoded`   — counter, ABI-decoded logs
//! - `chainlogs.events_heuristic` — counter, logs decoded from a learned signature
//! - `chainlogs.events_unknown`   — counter, logs left as `UnknownEvent`
//! - `chainlogs.decode_errors`    — counter, tagged with `error_kind`
//! - `chainlogs.batch_size`       — histogram
//! - `chainlogs.batch_latency_ms` — histogram
//!
//! ## Structured logging
//! Human-readable or JSON logs, with levels configurable per component.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::DecodeMetrics;
pub use tracing_setup::{build_filter, init_tracing, LogConfig};
