//! Engine module: the external transcoding capability.
//!
//! A [`Transcoder`] owns an isolated virtual workspace of named byte buffers
//! and runs ffmpeg-style command lines against it. Before it can be used it
//! must be loaded from three assets (core, binary, worker) which are fetched
//! by an [`AssetFetcher`] and staged on disk by an [`AssetStager`].
//!
//! # Example
//!
//! ```ignore
//! use audex_core::engine::{FfmpegEngine, EngineConfig, Transcoder};
//!
//! let engine = FfmpegEngine::new(config.engine.clone());
//! let mut logs = engine.subscribe_logs();
//! engine.load(&load_config).await?;
//!
//! engine.write_file("input.mp4", &bytes).await?;
//! let status = engine.exec(&args).await?;
//! let mp3 = engine.read_file("output.mp3").await?;
//! ```

mod assets;
mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use assets::{sha256_hex, verify_pin, AssetStager, HttpAssetFetcher};
pub use config::EngineConfig;
pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use traits::{AssetFetcher, Transcoder};
pub use types::{
    is_valid_entry_name, AssetKind, AssetLocation, AssetSpec, EngineAssets, EngineLoadConfig,
    EngineLog, ExecStatus, FetchedAsset, StagedAsset,
};
