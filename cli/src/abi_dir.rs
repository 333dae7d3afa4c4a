//! `AbiSource` over a directory of `<address>.json` ABI files.

use alloy_primitives::Address;
use async_trait::async_trait;
use chainlogs_registry::{parse_abi_json, AbiLookup, AbiSource, SourceError};
use std::{path::PathBuf, sync::Arc};

pub struct DirAbiSource {
    dir: PathBuf,
}

impl DirAbiSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, address: Address) -> PathBuf {
        // Lowercase hex, no checksum: `0xa0b8...eb48.json`
        self.dir.join(format!("{address:#x}.json"))
    }
}

#[async_trait]
impl AbiSource for DirAbiSource {
    async fn fetch_abi(&self, address: Address) -> Result<AbiLookup, SourceError> {
        let path = self.path_for(address);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AbiLookup::NotFound),
            Err(e) => return Err(SourceError::Unavailable(format!("{}: {e}", path.display()))),
        };
        let items = parse_abi_json(&text).map_err(|e| SourceError::InvalidResponse {
            address,
            reason: e.to_string(),
        })?;
        Ok(AbiLookup::Found(Arc::new(items)))
    }
}
