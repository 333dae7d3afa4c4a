//! `AbiSource` — where contract ABIs come from.
//!
//! The registry never fetches anything itself. Callers implement `AbiSource`
//! over an explorer API, a database, or local files, optionally wrap it in
//! `CachedAbiSource`, and feed results in with `ingest_from_source`.

use alloy_primitives::Address;
use async_trait::async_trait;
use chainlogs_core::{BoundedCache, CacheConfig, ConfigError};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::SignatureRegistry;

/// Result of an ABI fetch that reached the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AbiLookup {
    Found(Arc<Vec<Value>>),
    /// The backend has no ABI for this address (unverified contract)
    NotFound,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("ABI source unavailable: {0}")]
    Unavailable(String),

    #[error("ABI for {address} could not be read: {reason}")]
    InvalidResponse { address: Address, reason: String },
}

/// Async collaborator that resolves a contract address to its ABI items.
#[async_trait]
pub trait AbiSource: Send + Sync {
    async fn fetch_abi(&self, address: Address) -> Result<AbiLookup, SourceError>;
}

/// In-memory source, mostly for tests and file-backed CLI runs.
#[derive(Debug, Default, Clone)]
pub struct StaticAbiSource {
    abis: HashMap<Address, Arc<Vec<Value>>>,
}

impl StaticAbiSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_abi(mut self, address: Address, items: Vec<Value>) -> Self {
        self.insert(address, items);
        self
    }

    pub fn insert(&mut self, address: Address, items: Vec<Value>) {
        self.abis.insert(address, Arc::new(items));
    }
}

#[async_trait]
impl AbiSource for StaticAbiSource {
    async fn fetch_abi(&self, address: Address) -> Result<AbiLookup, SourceError> {
        Ok(match self.abis.get(&address) {
            Some(items) => AbiLookup::Found(Arc::clone(items)),
            None => AbiLookup::NotFound,
        })
    }
}

/// Wraps a source with a `BoundedCache` keyed by contract address.
///
/// Only found ABIs are cached; misses and errors always reach the inner
/// source again.
pub struct CachedAbiSource<S> {
    inner: S,
    cache: BoundedCache<Address, Arc<Vec<Value>>>,
}

impl<S: AbiSource> CachedAbiSource<S> {
    pub fn new(inner: S, config: &CacheConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner,
            cache: BoundedCache::from_config(config)?,
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: AbiSource> AbiSource for CachedAbiSource<S> {
    async fn fetch_abi(&self, address: Address) -> Result<AbiLookup, SourceError> {
        if let Some(items) = self.cache.get(&address) {
            debug!(%address, "ABI cache hit");
            return Ok(AbiLookup::Found(items));
        }
        let lookup = self.inner.fetch_abi(address).await?;
        if let AbiLookup::Found(items) = &lookup {
            self.cache.set(address, Arc::clone(items));
        }
        Ok(lookup)
    }
}

/// Outcome of `ingest_from_source`.
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Newly registered event definitions across all addresses
    pub registered: usize,
    pub not_found: Vec<Address>,
    pub failed: Vec<(Address, SourceError)>,
}

/// Fetch the ABI of each address and register its events.
///
/// Addresses are fetched one after another; a failure for one address is
/// recorded and the rest continue.
pub async fn ingest_from_source<S>(
    source: &S,
    registry: &SignatureRegistry,
    addresses: impl IntoIterator<Item = Address>,
) -> IngestSummary
where
    S: AbiSource + ?Sized,
{
    let mut summary = IngestSummary::default();
    for address in addresses {
        match source.fetch_abi(address).await {
            Ok(AbiLookup::Found(items)) => {
                let report = registry.register(&items);
                summary.registered += report.added.len();
            }
            Ok(AbiLookup::NotFound) => summary.not_found.push(address),
            Err(e) => {
                warn!(%address, error = %e, "ABI fetch failed");
                summary.failed.push((address, e));
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn token_abi() -> Vec<Value> {
        vec![json!({"type": "event", "name": "Transfer", "inputs": [
            {"name": "from", "type": "address", "indexed": true},
            {"name": "to", "type": "address", "indexed": true},
            {"name": "value", "type": "uint256", "indexed": false}
        ]})]
    }

    struct Counting {
        inner: StaticAbiSource,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AbiSource for Counting {
        async fn fetch_abi(&self, address: Address) -> Result<AbiLookup, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_abi(address).await
        }
    }

    struct Failing;

    #[async_trait]
    impl AbiSource for Failing {
        async fn fetch_abi(&self, _address: Address) -> Result<AbiLookup, SourceError> {
            Err(SourceError::Unavailable("rate limited".into()))
        }
    }

    #[tokio::test]
    async fn cache_serves_repeat_fetches() {
        let token = Address::repeat_byte(0x01);
        let counting = Counting {
            inner: StaticAbiSource::new().with_abi(token, token_abi()),
            calls: AtomicUsize::new(0),
        };
        let cached = CachedAbiSource::new(counting, &CacheConfig::default()).unwrap();

        for _ in 0..3 {
            assert!(matches!(cached.fetch_abi(token).await.unwrap(), AbiLookup::Found(_)));
        }
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.cached_len(), 1);
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let counting = Counting {
            inner: StaticAbiSource::new(),
            calls: AtomicUsize::new(0),
        };
        let cached = CachedAbiSource::new(counting, &CacheConfig::default()).unwrap();
        let addr = Address::repeat_byte(0x02);
        assert_eq!(cached.fetch_abi(addr).await.unwrap(), AbiLookup::NotFound);
        assert_eq!(cached.fetch_abi(addr).await.unwrap(), AbiLookup::NotFound);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cached_len(), 0);
    }

    #[tokio::test]
    async fn ingest_registers_and_reports() {
        let token = Address::repeat_byte(0x01);
        let unverified = Address::repeat_byte(0x02);
        let source = StaticAbiSource::new().with_abi(token, token_abi());
        let registry = SignatureRegistry::new();

        let summary = ingest_from_source(&source, &registry, [token, unverified, token]).await;
        assert_eq!(summary.registered, 1);
        assert_eq!(summary.not_found, vec![unverified]);
        assert!(summary.failed.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn ingest_continues_past_failures() {
        let registry = SignatureRegistry::new();
        let summary =
            ingest_from_source(&Failing, &registry, [Address::ZERO, Address::repeat_byte(9)]).await;
        assert_eq!(summary.failed.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = CacheConfig { capacity: 0, ttl_secs: 10 };
        assert!(matches!(
            CachedAbiSource::new(StaticAbiSource::new(), &config),
            Err(ConfigError::ZeroCapacity)
        ));
    }
}
