//! Configuration for the engine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::EngineAssets;

/// Configuration for the transcoding engine and its bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory backing the engine's virtual workspace.
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Directory where fetched assets are staged before loading.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timeout for fetching a single remote asset, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Engine assets. Required.
    pub assets: EngineAssets,
}

fn default_workspace_dir() -> PathBuf {
    std::env::temp_dir().join("audex").join("workspace")
}

fn default_asset_dir() -> PathBuf {
    std::env::temp_dir().join("audex").join("assets")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fetch_timeout() -> u64 {
    120
}

impl EngineConfig {
    /// Creates a config for the given assets with default directories.
    pub fn new(assets: EngineAssets) -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
            asset_dir: default_asset_dir(),
            log_level: default_log_level(),
            fetch_timeout_secs: default_fetch_timeout(),
            assets,
        }
    }

    /// Sets the workspace directory.
    pub fn with_workspace_dir(mut self, dir: PathBuf) -> Self {
        self.workspace_dir = dir;
        self
    }

    /// Sets the asset staging directory.
    pub fn with_asset_dir(mut self, dir: PathBuf) -> Self {
        self.asset_dir = dir;
        self
    }

    /// Sets the ffmpeg log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AssetSpec;

    fn assets() -> EngineAssets {
        EngineAssets {
            core: AssetSpec::new("/usr/bin/ffmpeg"),
            binary: AssetSpec::new("/usr/bin/ffprobe"),
            worker: AssetSpec::new("assets/worker.preset"),
        }
    }

    #[test]
    fn test_default_directories() {
        let config = EngineConfig::new(assets());
        assert!(config.workspace_dir.ends_with("audex/workspace"));
        assert!(config.asset_dir.ends_with("audex/assets"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.fetch_timeout_secs, 120);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new(assets())
            .with_workspace_dir(PathBuf::from("/tmp/ws"))
            .with_asset_dir(PathBuf::from("/tmp/assets"))
            .with_log_level("warning");

        assert_eq!(config.workspace_dir, PathBuf::from("/tmp/ws"));
        assert_eq!(config.asset_dir, PathBuf::from("/tmp/assets"));
        assert_eq!(config.log_level, "warning");
    }

    #[test]
    fn test_assets_required() {
        let result: Result<EngineConfig, _> = toml::from_str(r#"log_level = "info""#);
        assert!(result.is_err());
    }
}
