use std::sync::Arc;

use audex_core::{
    Config, DirectoryDelivery, ExtractionWorkflow, FanoutReporter, LatestStatus, OutputDelivery,
    SanitizedConfig, SessionState, StatusReporter, TracingReporter, TranscoderSession,
};
use audex_core::engine::{AssetFetcher, AssetStager, Transcoder};
use tracing::info;

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    workflow: Arc<ExtractionWorkflow>,
    status: LatestStatus,
    ws_broadcaster: WsBroadcaster,
    save_delivery: Option<Arc<dyn OutputDelivery>>,
}

impl AppState {
    /// Wires the workflow around `engine` and `fetcher`.
    ///
    /// Status messages go to the latest-status slot, every WebSocket client
    /// and the tracing log. Engine state transitions are broadcast as well.
    pub fn build(
        config: Config,
        engine: Arc<dyn Transcoder>,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        let status = LatestStatus::new();
        let ws_broadcaster = WsBroadcaster::default();

        let reporter: Arc<dyn StatusReporter> = Arc::new(
            FanoutReporter::new()
                .with(Arc::new(status.clone()))
                .with(Arc::new(ws_broadcaster.clone()))
                .with(Arc::new(TracingReporter)),
        );

        let broadcaster = ws_broadcaster.clone();
        let session = TranscoderSession::new(
            engine,
            fetcher,
            AssetStager::new(config.engine.asset_dir.clone()),
            Arc::clone(&reporter),
        )
        .with_state_callback(Arc::new(move |state: &SessionState| {
            broadcaster.engine_state(state);
        }));

        let workflow = ExtractionWorkflow::from_session(&config, Arc::new(session), reporter);

        let save_delivery: Option<Arc<dyn OutputDelivery>> =
            config.delivery.save_dir.as_ref().map(|dir| {
                info!("Saving extracted audio copies to {:?}", dir);
                Arc::new(DirectoryDelivery::new(dir.clone())) as Arc<dyn OutputDelivery>
            });

        Self {
            config,
            workflow: Arc::new(workflow),
            status,
            ws_broadcaster,
            save_delivery,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn workflow(&self) -> &Arc<ExtractionWorkflow> {
        &self.workflow
    }

    pub fn status(&self) -> &LatestStatus {
        &self.status
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }

    /// Directory delivery for saved copies, when `delivery.save_dir` is set.
    pub fn save_delivery(&self) -> Option<&Arc<dyn OutputDelivery>> {
        self.save_delivery.as_ref()
    }
}
