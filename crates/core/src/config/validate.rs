use super::{types::Config, ConfigError};
use crate::delivery::is_valid_filename;
use crate::engine::AssetKind;
use crate::pipeline::MAX_QUALITY;

/// Validate configuration
/// Currently validates:
/// - Engine assets exist (enforced by serde) and are non-empty
/// - Server port is not 0
/// - Conversion quality is on the 0..=9 VBR scale
/// - Accepted input type is set
/// - Delivery filename is a plain file name
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Engine validation
    for kind in AssetKind::ALL {
        if config.engine.assets.get(kind).location.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "engine.assets.{} location cannot be empty",
                kind
            )));
        }
    }

    if config.conversion.quality > MAX_QUALITY {
        return Err(ConfigError::ValidationError(format!(
            "conversion.quality must be between 0 and {}, got {}",
            MAX_QUALITY, config.conversion.quality
        )));
    }

    if config.selector.accepted_type.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "selector.accepted_type cannot be empty".to_string(),
        ));
    }

    if !is_valid_filename(&config.delivery.filename) {
        return Err(ConfigError::ValidationError(format!(
            "delivery.filename must be a plain file name, got {:?}",
            config.delivery.filename
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AssetSpec, EngineAssets};
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[engine.assets]
core = "/usr/bin/ffmpeg"
binary = "/usr/bin/ffprobe"
worker = "worker.preset"
"#,
        )
        .unwrap()
    }

    fn assert_invalid(config: &Config, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains(needle), "{}", msg),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        assert_invalid(&config, "server.port");
    }

    #[test]
    fn test_validate_quality_range() {
        let mut config = valid_config();
        config.conversion.quality = 9;
        assert!(validate_config(&config).is_ok());

        config.conversion.quality = 10;
        assert_invalid(&config, "conversion.quality");
    }

    #[test]
    fn test_validate_empty_asset_location() {
        let mut config = valid_config();
        config.engine.assets = EngineAssets {
            core: AssetSpec::new("/usr/bin/ffmpeg"),
            binary: AssetSpec::new("  "),
            worker: AssetSpec::new("worker.preset"),
        };
        assert_invalid(&config, "engine.assets.binary");
    }

    #[test]
    fn test_validate_accepted_type() {
        let mut config = valid_config();
        config.selector.accepted_type = String::new();
        assert_invalid(&config, "selector.accepted_type");
    }

    #[test]
    fn test_validate_delivery_filename() {
        let mut config = valid_config();
        config.delivery.filename = "../../etc/audio.mp3".to_string();
        assert_invalid(&config, "delivery.filename");
    }
}
