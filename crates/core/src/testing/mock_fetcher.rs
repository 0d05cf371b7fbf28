//! Mock asset fetcher for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{
    sha256_hex, verify_pin, AssetFetcher, AssetKind, AssetSpec, EngineAssets, EngineError,
    FetchedAsset,
};

/// A recorded fetch for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub kind: AssetKind,
    pub location: String,
    pub success: bool,
}

/// Mock implementation of the AssetFetcher trait.
///
/// Serves bytes registered per location; unknown locations fail like an
/// unreachable URL.
#[derive(Debug, Default)]
pub struct MockAssetFetcher {
    assets: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
}

impl MockAssetFetcher {
    /// Create a fetcher that serves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher serving placeholder bytes for all three assets.
    pub fn with_assets(assets: &EngineAssets) -> Self {
        let map = AssetKind::ALL
            .iter()
            .map(|kind| {
                (
                    assets.get(*kind).location.clone(),
                    format!("{} asset", kind).into_bytes(),
                )
            })
            .collect();
        Self {
            assets: Arc::new(RwLock::new(map)),
            ..Self::default()
        }
    }

    /// Serve `bytes` at `location`.
    pub async fn set_asset(&self, location: &str, bytes: Vec<u8>) {
        self.assets.write().await.insert(location.to_string(), bytes);
    }

    /// Make fetches of `location` fail.
    pub async fn fail_location(&self, location: &str) {
        self.failing.write().await.insert(location.to_string());
    }

    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    async fn resolve(&self, kind: AssetKind, spec: &AssetSpec) -> Result<FetchedAsset, EngineError> {
        if self.failing.read().await.contains(&spec.location) {
            return Err(EngineError::fetch_failed(
                kind,
                &spec.location,
                "HTTP 404 Not Found",
            ));
        }

        let bytes = self
            .assets
            .read()
            .await
            .get(&spec.location)
            .cloned()
            .ok_or_else(|| EngineError::fetch_failed(kind, &spec.location, "connection refused"))?;

        let sha256 = sha256_hex(&bytes);
        verify_pin(kind, spec, &sha256)?;

        Ok(FetchedAsset {
            kind,
            location: spec.location.clone(),
            bytes,
            sha256,
        })
    }
}

#[async_trait]
impl AssetFetcher for MockAssetFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, kind: AssetKind, spec: &AssetSpec) -> Result<FetchedAsset, EngineError> {
        let result = self.resolve(kind, spec).await;
        self.fetches.write().await.push(RecordedFetch {
            kind,
            location: spec.location.clone(),
            success: result.is_ok(),
        });
        result
    }
}
