//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the engine, asset fetcher and
//! delivery traits, so the workflow can be exercised without ffmpeg or
//! network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use audex_core::testing::{fixtures, MockAssetFetcher, MockTranscoder, RecordingReporter};
//!
//! let engine = Arc::new(MockTranscoder::new());
//! let fetcher = Arc::new(MockAssetFetcher::with_assets(&fixtures::engine_assets()));
//! let reporter = Arc::new(RecordingReporter::new());
//!
//! engine.set_output(fixtures::sample_mp3()).await;
//! ```

mod mock_delivery;
mod mock_fetcher;
mod mock_transcoder;
mod recording_reporter;

pub use mock_delivery::{MockDelivery, RecordedDelivery};
pub use mock_fetcher::{MockAssetFetcher, RecordedFetch};
pub use mock_transcoder::MockTranscoder;
pub use recording_reporter::RecordingReporter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};
    use uuid::Uuid;

    use crate::config::{Config, ServerConfig};
    use crate::delivery::DeliveryConfig;
    use crate::engine::{AssetKind, AssetSpec, EngineAssets, EngineConfig, EngineLoadConfig, StagedAsset};
    use crate::pipeline::{ConversionConfig, ConversionResult};
    use crate::selector::{FileCandidate, SelectorConfig};

    /// Asset locations that only the mock fetcher knows.
    pub fn engine_assets() -> EngineAssets {
        EngineAssets {
            core: AssetSpec::new("https://assets.audex.test/ffmpeg"),
            binary: AssetSpec::new("https://assets.audex.test/ffprobe"),
            worker: AssetSpec::new("https://assets.audex.test/worker.preset"),
        }
    }

    /// A load config pointing at files that do not need to exist.
    pub fn load_config() -> EngineLoadConfig {
        let staged = |kind: AssetKind| StagedAsset {
            kind,
            path: PathBuf::from(format!("/tmp/audex-test/{}", kind)),
            sha256: String::new(),
            size_bytes: 0,
        };
        EngineLoadConfig {
            core: staged(AssetKind::Core),
            binary: staged(AssetKind::Binary),
            worker: staged(AssetKind::Worker),
        }
    }

    /// Leading bytes of an MP4: an `ftyp` box with brand `isom`.
    pub fn sample_mp4() -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
        bytes.extend_from_slice(b"ftypisom");
        bytes.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
        bytes.extend_from_slice(b"isomiso2");
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    /// An ID3v2 header followed by one MPEG-1 Layer III frame header.
    pub fn sample_mp3() -> Vec<u8> {
        let mut bytes = b"ID3".to_vec();
        bytes.extend_from_slice(&[0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    /// An MP4 upload as a selection candidate.
    pub fn mp4_candidate(name: &str) -> FileCandidate {
        FileCandidate::from_bytes(name, "video/mp4", sample_mp4())
    }

    /// A conversion result holding `bytes`.
    pub fn conversion_result(bytes: Vec<u8>) -> ConversionResult {
        ConversionResult::new(Uuid::new_v4(), bytes, sample_mp4().len() as u64, 1)
    }

    /// A complete configuration rooted in `dir`, using [`engine_assets`].
    pub fn config(dir: &Path) -> Config {
        Config {
            server: ServerConfig::default(),
            engine: EngineConfig::new(engine_assets())
                .with_workspace_dir(dir.join("workspace"))
                .with_asset_dir(dir.join("assets")),
            selector: SelectorConfig::default(),
            conversion: ConversionConfig::default(),
            delivery: DeliveryConfig::default(),
        }
    }
}
