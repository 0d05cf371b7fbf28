//! The user-facing workflow: select a file, load the engine, extract, deliver.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::delivery::{DeliveryError, DeliveryReceipt, OutputDelivery};
use crate::engine::{AssetFetcher, AssetStager, EngineAssets, Transcoder};
use crate::pipeline::{ConversionPipeline, ConversionResult, PipelineError};
use crate::selector::{FileCandidate, FileSelector, MediaFile, SelectError};
use crate::session::{SessionError, SessionState, TranscoderSession};
use crate::status::StatusReporter;

/// Any error the workflow can surface.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Ties the selector, session, pipeline and delivery together.
///
/// Conversions are serialized: a second `extract_audio` waits for the first
/// to finish.
pub struct ExtractionWorkflow {
    selector: FileSelector,
    session: Arc<TranscoderSession>,
    pipeline: ConversionPipeline,
    assets: EngineAssets,
    delivery_filename: String,
    conversion_lock: Mutex<()>,
}

impl ExtractionWorkflow {
    pub fn new(
        selector: FileSelector,
        session: Arc<TranscoderSession>,
        pipeline: ConversionPipeline,
        assets: EngineAssets,
        delivery_filename: impl Into<String>,
    ) -> Self {
        Self {
            selector,
            session,
            pipeline,
            assets,
            delivery_filename: delivery_filename.into(),
            conversion_lock: Mutex::new(()),
        }
    }

    /// Wires a workflow from configuration around the given engine and fetcher.
    pub fn from_config(
        config: &Config,
        engine: Arc<dyn Transcoder>,
        fetcher: Arc<dyn AssetFetcher>,
        status: Arc<dyn StatusReporter>,
    ) -> Self {
        let session = TranscoderSession::new(
            engine,
            fetcher,
            AssetStager::new(config.engine.asset_dir.clone()),
            Arc::clone(&status),
        );
        Self::from_session(config, Arc::new(session), status)
    }

    /// Like [`from_config`](Self::from_config) with an already built session.
    pub fn from_session(
        config: &Config,
        session: Arc<TranscoderSession>,
        status: Arc<dyn StatusReporter>,
    ) -> Self {
        Self::new(
            FileSelector::new(&config.selector),
            session,
            ConversionPipeline::new(config.conversion.clone(), status),
            config.engine.assets.clone(),
            config.delivery.filename.clone(),
        )
    }

    pub fn session(&self) -> &Arc<TranscoderSession> {
        &self.session
    }

    pub fn selector(&self) -> &FileSelector {
        &self.selector
    }

    pub fn delivery_filename(&self) -> &str {
        &self.delivery_filename
    }

    pub async fn select_file(&self, candidate: FileCandidate) -> Result<MediaFile, WorkflowError> {
        Ok(self.selector.select(candidate).await?)
    }

    pub async fn current_file(&self) -> Option<MediaFile> {
        self.selector.current().await
    }

    /// Loads the engine from the configured assets.
    pub async fn load_engine(&self) -> Result<(), WorkflowError> {
        Ok(self.session.initialize(&self.assets).await?)
    }

    pub async fn engine_state(&self) -> SessionState {
        self.session.state().await
    }

    /// Extracts audio from the current selection.
    pub async fn extract_audio(&self) -> Result<ConversionResult, WorkflowError> {
        let _guard = self.conversion_lock.lock().await;
        let file = self.selector.current().await;
        debug!(file = ?file.as_ref().map(|f| f.name.as_str()), "Extraction requested");
        Ok(self.pipeline.extract_audio(&self.session, file.as_ref()).await?)
    }

    /// Extracts audio and hands it to `delivery` under the configured filename.
    ///
    /// `delivery` is only invoked after a successful conversion.
    pub async fn extract_and_deliver(
        &self,
        delivery: &dyn OutputDelivery,
    ) -> Result<(ConversionResult, DeliveryReceipt), WorkflowError> {
        let result = self.extract_audio().await?;
        let receipt = delivery.deliver(&result, &self.delivery_filename).await?;
        info!(
            delivery = delivery.name(),
            filename = %receipt.filename,
            "Extracted audio delivered"
        );
        Ok((result, receipt))
    }
}
