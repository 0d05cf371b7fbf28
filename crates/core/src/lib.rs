pub mod config;
pub mod delivery;
pub mod engine;
pub mod metrics;
pub mod pipeline;
pub mod selector;
pub mod session;
pub mod status;
pub mod testing;
pub mod workflow;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    ServerConfig,
};
pub use delivery::{DeliveryConfig, DeliveryError, DeliveryReceipt, DirectoryDelivery, OutputDelivery};
pub use engine::{
    AssetFetcher, AssetStager, EngineAssets, EngineConfig, EngineError, FfmpegEngine,
    HttpAssetFetcher, Transcoder,
};
pub use pipeline::{ConversionConfig, ConversionPipeline, ConversionResult, PipelineError};
pub use selector::{FileCandidate, FileSelector, MediaFile, SelectError, SelectorConfig};
pub use session::{SessionError, SessionState, TranscoderSession};
pub use status::{FanoutReporter, LatestStatus, StatusReporter, StatusUpdate, TracingReporter};
pub use workflow::{ExtractionWorkflow, WorkflowError};
