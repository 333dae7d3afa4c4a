//! ChainLogs metrics definitions.
//!
//! All metrics use OpenTelemetry conventions and are exported through
//! whatever `MeterProvider` the host application installs.

use chainlogs_batch::BatchResult;
use chainlogs_core::DecodeErrorKind;
use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};
use std::time::Duration;

/// Central metrics handle for ChainLogs.
#[derive(Clone)]
pub struct DecodeMetrics {
    pub events_decoded: Counter<u64>,
    pub events_heuristic: Counter<u64>,
    pub events_unknown: Counter<u64>,
    pub decode_errors: Counter<u64>,
    pub batch_size: Histogram<u64>,
    pub batch_latency_ms: Histogram<f64>,
}

impl DecodeMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            events_decoded: meter
                .u64_counter("chainlogs.events_decoded")
                .with_description("Logs decoded from a registered ABI")
                .build(),
            events_heuristic: meter
                .u64_counter("chainlogs.events_heuristic")
                .with_description("Logs decoded from a learned signature only")
                .build(),
            events_unknown: meter
                .u64_counter("chainlogs.events_unknown")
                .with_description("Logs that resolved to an unknown event")
                .build(),
            decode_errors: meter
                .u64_counter("chainlogs.decode_errors")
                .with_description("Logs whose ABI decode failed")
                .build(),
            batch_size: meter
                .u64_histogram("chainlogs.batch_size")
                .with_description("Number of logs in a scheduler run")
                .build(),
            batch_latency_ms: meter
                .f64_histogram("chainlogs.batch_latency_ms")
                .with_description("Wall time of a scheduler run in milliseconds")
                .build(),
        }
    }

    pub fn record_error(&self, kind: DecodeErrorKind) {
        self.decode_errors
            .add(1, &[KeyValue::new("error_kind", kind.as_str())]);
    }

    /// Record counters and histograms for a whole scheduler run.
    pub fn record_batch(&self, result: &BatchResult, elapsed: Duration) {
        let stats = &result.stats;
        self.events_decoded.add(stats.decoded as u64, &[]);
        self.events_heuristic.add(stats.heuristic as u64, &[]);
        self.events_unknown.add(stats.unknown as u64, &[]);
        for failure in result.outcomes().filter_map(|o| o.failure()) {
            self.record_error(failure.kind);
        }
        self.batch_size.record(stats.total_input as u64, &[]);
        self.batch_latency_ms
            .record(elapsed.as_secs_f64() * 1_000.0, &[]);
    }
}
