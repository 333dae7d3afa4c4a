//! `chainlogs.yaml` — optional run configuration.
//!
//! ```yaml
//! scheduler:
//!   concurrency: 8
//!   chunk_size: 1000
//! cache:
//!   capacity: 1000
//!   ttl_secs: 86400
//! log:
//!   level: info
//!   json: false
//!   components:
//!     chainlogs-batch: debug
//! ```

use anyhow::{Context, Result};
use chainlogs_batch::SchedulerConfig;
use chainlogs_core::CacheConfig;
use chainlogs_observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainlogsConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ChainlogsConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config '{}'", path.display()))?;
        let config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config '{}'", path.display()))?;
        config.scheduler.validate()?;
        config.cache.validate()?;
        Ok(config)
    }
}
