//! Asset fetching and staging for engine bootstrap.

use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::error::EngineError;
use super::traits::AssetFetcher;
use super::types::{AssetKind, AssetLocation, AssetSpec, FetchedAsset, StagedAsset};

/// Lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Checks a fetched asset against its configured pin, if any.
pub fn verify_pin(kind: AssetKind, spec: &AssetSpec, actual: &str) -> Result<(), EngineError> {
    match spec.sha256.as_deref() {
        Some(expected) if !expected.eq_ignore_ascii_case(actual) => {
            Err(EngineError::AssetChecksumMismatch {
                kind,
                expected: expected.to_lowercase(),
                actual: actual.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Fetches assets over HTTP(S) or from the local filesystem.
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    /// Creates a fetcher whose remote requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch_url(&self, kind: AssetKind, url: &str) -> Result<Vec<u8>, EngineError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EngineError::fetch_failed(kind, url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::fetch_failed(
                kind,
                url,
                format!("HTTP status {}", status),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::fetch_failed(kind, url, e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_file(kind: AssetKind, path: &Path) -> Result<Vec<u8>, EngineError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| EngineError::fetch_failed(kind, path.display().to_string(), e.to_string()))
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, kind: AssetKind, spec: &AssetSpec) -> Result<FetchedAsset, EngineError> {
        let bytes = match spec.parsed_location() {
            AssetLocation::Url(url) => self.fetch_url(kind, &url).await?,
            AssetLocation::File(path) => Self::fetch_file(kind, &path).await?,
        };

        if bytes.is_empty() {
            return Err(EngineError::fetch_failed(kind, &spec.location, "asset is empty"));
        }

        let sha256 = sha256_hex(&bytes);
        verify_pin(kind, spec, &sha256)?;

        debug!(
            kind = %kind,
            location = %spec.location,
            size = bytes.len(),
            "Fetched engine asset"
        );

        Ok(FetchedAsset {
            kind,
            location: spec.location.clone(),
            bytes,
            sha256,
        })
    }
}

/// Writes fetched assets into a staging directory.
///
/// The staged file is the locally loadable address handed to the engine.
#[derive(Debug, Clone)]
pub struct AssetStager {
    dir: PathBuf,
}

impl AssetStager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an asset of `kind` fetched from `location` is staged at.
    pub fn staged_path(&self, kind: AssetKind, location: &str) -> PathBuf {
        let file_name = AssetLocation::parse(location)
            .file_name()
            .unwrap_or_else(|| "asset".to_string());
        self.dir.join(format!("{}-{}", kind.as_str(), file_name))
    }

    /// Stages one asset. On unix the staged file is made executable.
    pub async fn stage(&self, asset: &FetchedAsset) -> Result<StagedAsset, EngineError> {
        let path = self.staged_path(asset.kind, &asset.location);
        let staging_err = |source| EngineError::StagingFailed {
            kind: asset.kind,
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(staging_err)?;
        tokio::fs::write(&path, &asset.bytes)
            .await
            .map_err(staging_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(staging_err)?;
        }

        Ok(StagedAsset {
            kind: asset.kind,
            path,
            sha256: asset.sha256.clone(),
            size_bytes: asset.bytes.len() as u64,
        })
    }
}
