use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::delivery::DeliveryConfig;
use crate::engine::{AssetSpec, EngineConfig};
use crate::pipeline::ConversionConfig;
use crate::selector::SelectorConfig;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Engine section; `[engine.assets]` is required.
    pub engine: EngineConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted upload, in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload() -> usize {
    512 * 1024 * 1024 // 512 MB
}

/// Sanitized config for API responses (asset credentials redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub engine: SanitizedEngineConfig,
    pub selector: SelectorConfig,
    pub conversion: ConversionConfig,
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEngineConfig {
    pub log_level: String,
    pub fetch_timeout_secs: u64,
    pub assets: SanitizedAssets,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAssets {
    pub core: SanitizedAsset,
    pub binary: SanitizedAsset,
    pub worker: SanitizedAsset,
}

/// Asset location without query string (signed URLs carry tokens there)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAsset {
    pub location: String,
    pub pinned: bool,
}

impl From<&AssetSpec> for SanitizedAsset {
    fn from(spec: &AssetSpec) -> Self {
        let location = spec
            .location
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            location,
            pinned: spec.sha256.is_some(),
        }
    }
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let assets = &config.engine.assets;
        Self {
            server: config.server.clone(),
            engine: SanitizedEngineConfig {
                log_level: config.engine.log_level.clone(),
                fetch_timeout_secs: config.engine.fetch_timeout_secs,
                assets: SanitizedAssets {
                    core: (&assets.core).into(),
                    binary: (&assets.binary).into(),
                    worker: (&assets.worker).into(),
                },
            },
            selector: config.selector.clone(),
            conversion: config.conversion.clone(),
            delivery: config.delivery.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSETS: &str = r#"
[engine.assets]
core = "/usr/bin/ffmpeg"
binary = "/usr/bin/ffprobe"
worker = "assets/worker.preset"
"#;

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = toml::from_str(ASSETS).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.selector.accepted_type, "video/mp4");
        assert_eq!(config.conversion.quality, 2);
        assert!(config.conversion.scoped_entries);
        assert!(config.conversion.cleanup_workspace);
        assert_eq!(config.delivery.filename, "extracted_audio.mp3");
        assert!(config.delivery.save_dir.is_none());
        assert_eq!(config.engine.log_level, "info");
        assert_eq!(config.engine.assets.core.location, "/usr/bin/ffmpeg");
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
max_upload_bytes = 1048576

[engine]
workspace_dir = "/var/lib/audex/workspace"
log_level = "warning"

[engine.assets]
core = { location = "https://cdn.example.org/ffmpeg", sha256 = "abc123" }
binary = "file:///opt/ffprobe"
worker = "preset.txt"

[selector]
accepted_type = "video/quicktime"

[conversion]
quality = 0
scoped_entries = false
cleanup_workspace = false

[delivery]
filename = "audio.mp3"
save_dir = "/srv/out"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.max_upload_bytes, 1048576);
        assert_eq!(
            config.engine.workspace_dir.to_str().unwrap(),
            "/var/lib/audex/workspace"
        );
        assert_eq!(config.engine.assets.core.sha256.as_deref(), Some("abc123"));
        assert_eq!(config.selector.accepted_type, "video/quicktime");
        assert_eq!(config.conversion.quality, 0);
        assert!(!config.conversion.scoped_entries);
        assert_eq!(config.delivery.save_dir.unwrap().to_str().unwrap(), "/srv/out");
    }

    #[test]
    fn test_deserialize_missing_assets_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_strips_query() {
        let toml = r#"
[engine.assets]
core = { location = "https://cdn.example.org/ffmpeg?token=secret", sha256 = "abc" }
binary = "/usr/bin/ffprobe"
worker = "preset.txt"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);

        assert_eq!(sanitized.engine.assets.core.location, "https://cdn.example.org/ffmpeg");
        assert!(sanitized.engine.assets.core.pinned);
        assert!(!sanitized.engine.assets.binary.pinned);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
