//! Pipeline module: one audio extraction per call.
//!
//! The [`ConversionPipeline`] writes the selected file into the engine's
//! workspace, runs the MP3 extraction command and reads the result back.
//!
//! # Example
//!
//! ```ignore
//! use audex_core::pipeline::{ConversionConfig, ConversionPipeline};
//!
//! let pipeline = ConversionPipeline::new(ConversionConfig::default(), reporter);
//! let result = pipeline.extract_audio(&session, selector.current().await.as_ref()).await?;
//! assert_eq!(result.mime_type(), "audio/mp3");
//! ```

mod config;
mod error;
#[allow(clippy::module_inception)]
mod pipeline;
mod types;

pub use config::{ConversionConfig, MAX_QUALITY};
pub use error::PipelineError;
pub use pipeline::ConversionPipeline;
pub use types::{ConversionRequest, ConversionResult, MP3_CODEC, OUTPUT_MIME_TYPE};
