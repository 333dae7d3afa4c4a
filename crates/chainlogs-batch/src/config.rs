//! Scheduler configuration.

use chainlogs_core::ConfigError;
use serde::{Deserialize, Serialize};
use std::{num::NonZeroUsize, thread};

/// Worker pool and chunking parameters for `BatchScheduler`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of worker threads
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Max logs per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_concurrency() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn default_chunk_size() -> usize {
    1_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl SchedulerConfig {
    pub fn new(concurrency: usize, chunk_size: usize) -> Self {
        Self { concurrency, chunk_size }
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SchedulerConfig::default();
        assert_eq!(config.chunk_size, 1_000);
        assert!(config.concurrency >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_values_rejected() {
        assert_eq!(
            SchedulerConfig::new(0, 10).validate(),
            Err(ConfigError::ZeroConcurrency)
        );
        assert_eq!(
            SchedulerConfig::new(4, 0).validate(),
            Err(ConfigError::ZeroChunkSize)
        );
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: SchedulerConfig = serde_json::from_str(r#"{"chunk_size": 50}"#).unwrap();
        assert_eq!(config.chunk_size, 50);
        assert!(config.concurrency >= 1);
    }
}
