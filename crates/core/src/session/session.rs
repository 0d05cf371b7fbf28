//! Lifecycle of the single transcoding engine instance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::error::SessionError;
use crate::engine::{
    AssetFetcher, AssetKind, AssetSpec, AssetStager, EngineAssets, EngineError, EngineLoadConfig,
    StagedAsset, Transcoder,
};
use crate::metrics::{
    ASSET_FETCHES_TOTAL, ENGINE_LOADS_TOTAL, ENGINE_LOAD_DURATION, ENGINE_LOG_MESSAGES,
};
use crate::status::StatusReporter;

/// Bootstrap state of the engine.
///
/// `Unloaded -> Loading -> Ready`, or `Loading -> Failed`. There is no way
/// back to `Unloaded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unloaded,
    Loading,
    Ready,
    Failed { reason: String },
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked on every state transition.
pub type SessionStateCallback = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Owns one engine instance: bootstraps it once and hands it out when ready.
///
/// Construct one per process and share it (`Arc<TranscoderSession>`) with
/// whatever runs conversions.
pub struct TranscoderSession {
    engine: Arc<dyn Transcoder>,
    fetcher: Arc<dyn AssetFetcher>,
    stager: AssetStager,
    status: Arc<dyn StatusReporter>,
    state: RwLock<SessionState>,
    log_forwarder: StdMutex<Option<JoinHandle<()>>>,
    state_callback: Option<SessionStateCallback>,
}

impl TranscoderSession {
    pub fn new(
        engine: Arc<dyn Transcoder>,
        fetcher: Arc<dyn AssetFetcher>,
        stager: AssetStager,
        status: Arc<dyn StatusReporter>,
    ) -> Self {
        Self {
            engine,
            fetcher,
            stager,
            status,
            state: RwLock::new(SessionState::Unloaded),
            log_forwarder: StdMutex::new(None),
            state_callback: None,
        }
    }

    /// Registers a callback for state transitions.
    pub fn with_state_callback(mut self, callback: SessionStateCallback) -> Self {
        self.state_callback = Some(callback);
        self
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn is_ready(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Ready)
    }

    /// The engine, available only once the session is `Ready`.
    pub async fn engine(&self) -> Result<Arc<dyn Transcoder>, SessionError> {
        let state = self.state.read().await;
        match &*state {
            SessionState::Ready => Ok(Arc::clone(&self.engine)),
            other => Err(SessionError::NotReady {
                state: other.clone(),
            }),
        }
    }

    /// Fetches the engine assets, stages them and loads the engine.
    ///
    /// Calling this on a `Ready` session is a no-op. A failed bootstrap leaves
    /// the session `Failed` for the rest of the process.
    pub async fn initialize(&self, assets: &EngineAssets) -> Result<(), SessionError> {
        {
            let mut state = self.state.write().await;
            match &*state {
                SessionState::Ready => {
                    debug!("Engine already loaded");
                    return Ok(());
                }
                SessionState::Loading => return Err(SessionError::AlreadyLoading),
                SessionState::Failed { reason } => {
                    return Err(SessionError::Failed {
                        reason: reason.clone(),
                    })
                }
                SessionState::Unloaded => *state = SessionState::Loading,
            }
        }
        self.notify(&SessionState::Loading);

        // Logs may arrive any time from here on, including before Ready
        self.start_log_forwarding();

        info!(engine = self.engine.name(), "Loading transcoding engine");
        let start = Instant::now();

        match self.bootstrap(assets).await {
            Ok(()) => {
                self.set_state(SessionState::Ready).await;
                ENGINE_LOADS_TOTAL.with_label_values(&["success"]).inc();
                ENGINE_LOAD_DURATION
                    .with_label_values(&["success"])
                    .observe(start.elapsed().as_secs_f64());
                info!(
                    engine = self.engine.name(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Transcoding engine ready"
                );
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                self.set_state(SessionState::Failed {
                    reason: reason.clone(),
                })
                .await;
                ENGINE_LOADS_TOTAL.with_label_values(&["failed"]).inc();
                ENGINE_LOAD_DURATION
                    .with_label_values(&["failed"])
                    .observe(start.elapsed().as_secs_f64());
                error!(engine = self.engine.name(), error = %reason, "Engine failed to load");
                self.status
                    .report(&format!("Engine failed to load: {}", reason));
                Err(SessionError::EngineLoad(e))
            }
        }
    }

    async fn bootstrap(&self, assets: &EngineAssets) -> Result<(), EngineError> {
        let core = self.fetch_and_stage(AssetKind::Core, &assets.core).await?;
        let binary = self.fetch_and_stage(AssetKind::Binary, &assets.binary).await?;
        let worker = self.fetch_and_stage(AssetKind::Worker, &assets.worker).await?;

        self.engine
            .load(&EngineLoadConfig {
                core,
                binary,
                worker,
            })
            .await
    }

    async fn fetch_and_stage(
        &self,
        kind: AssetKind,
        spec: &AssetSpec,
    ) -> Result<StagedAsset, EngineError> {
        let fetched = match self.fetcher.fetch(kind, spec).await {
            Ok(asset) => {
                ASSET_FETCHES_TOTAL
                    .with_label_values(&[kind.as_str(), "success"])
                    .inc();
                asset
            }
            Err(e) => {
                ASSET_FETCHES_TOTAL
                    .with_label_values(&[kind.as_str(), "failed"])
                    .inc();
                return Err(e);
            }
        };

        let staged = self.stager.stage(&fetched).await?;
        debug!(
            kind = %kind,
            path = %staged.path.display(),
            sha256 = %staged.sha256,
            "Staged engine asset"
        );
        Ok(staged)
    }

    fn start_log_forwarding(&self) {
        let mut logs = self.engine.subscribe_logs();
        let status = Arc::clone(&self.status);

        let handle = tokio::spawn(async move {
            while let Some(log) = logs.recv().await {
                ENGINE_LOG_MESSAGES.inc();
                status.report(&log.message);
            }
        });

        let mut slot = self.log_forwarder.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    async fn set_state(&self, next: SessionState) {
        *self.state.write().await = next.clone();
        self.notify(&next);
    }

    fn notify(&self, state: &SessionState) {
        if let Some(callback) = &self.state_callback {
            callback(state);
        }
    }
}

impl Drop for TranscoderSession {
    fn drop(&mut self) {
        let slot = self.log_forwarder.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockAssetFetcher, MockTranscoder, RecordingReporter};
    use std::time::Duration;
    use tempfile::TempDir;

    struct Harness {
        session: TranscoderSession,
        engine: Arc<MockTranscoder>,
        fetcher: Arc<MockAssetFetcher>,
        reporter: Arc<RecordingReporter>,
        _temp: TempDir,
    }

    fn harness() -> Harness {
        let temp = TempDir::new().unwrap();
        let engine = Arc::new(MockTranscoder::new());
        let fetcher = Arc::new(MockAssetFetcher::with_assets(&fixtures::engine_assets()));
        let reporter = Arc::new(RecordingReporter::new());
        let session = TranscoderSession::new(
            engine.clone(),
            fetcher.clone(),
            AssetStager::new(temp.path().join("assets")),
            reporter.clone(),
        );
        Harness {
            session,
            engine,
            fetcher,
            reporter,
            _temp: temp,
        }
    }

    #[tokio::test]
    async fn test_initialize_reaches_ready() {
        let h = harness();
        assert_eq!(h.session.state().await, SessionState::Unloaded);
        assert!(h.session.engine().await.is_err());

        h.session
            .initialize(&fixtures::engine_assets())
            .await
            .unwrap();

        assert!(h.session.is_ready().await);
        assert!(h.session.engine().await.is_ok());
        assert_eq!(h.fetcher.fetch_count().await, 3);
        assert_eq!(h.engine.load_count().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_failed() {
        let h = harness();
        let assets = fixtures::engine_assets();
        h.fetcher.fail_location(&assets.binary.location).await;

        let result = h.session.initialize(&assets).await;
        assert!(matches!(result, Err(SessionError::EngineLoad(_))));
        assert!(matches!(
            h.session.state().await,
            SessionState::Failed { .. }
        ));
        assert_eq!(h.engine.load_count().await, 0);

        // No retry: the session stays failed
        let again = h.session.initialize(&assets).await;
        assert!(matches!(again, Err(SessionError::Failed { .. })));
        assert_eq!(h.engine.load_count().await, 0);
    }

    #[tokio::test]
    async fn test_engine_rejection_leaves_failed() {
        let h = harness();
        h.engine
            .set_next_error(EngineError::load_rejected("bad runtime"))
            .await;

        let err = h
            .session
            .initialize(&fixtures::engine_assets())
            .await
            .unwrap_err();
        assert!(err.is_load_error());
        assert!(!h.session.is_ready().await);
    }

    #[tokio::test]
    async fn test_initialize_twice_is_noop() {
        let h = harness();
        let assets = fixtures::engine_assets();
        h.session.initialize(&assets).await.unwrap();
        h.session.initialize(&assets).await.unwrap();

        assert_eq!(h.engine.load_count().await, 1);
        assert_eq!(h.fetcher.fetch_count().await, 3);
    }

    #[tokio::test]
    async fn test_logs_forwarded_to_reporter() {
        let h = harness();
        h.engine.set_load_logs(vec!["ffmpeg-core loaded".to_string()]).await;
        h.session
            .initialize(&fixtures::engine_assets())
            .await
            .unwrap();

        let message = h
            .reporter
            .wait_for_message(Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(message, "ffmpeg-core loaded");
    }

    #[tokio::test]
    async fn test_state_callback_sees_transitions() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let h = harness();
        let session = TranscoderSession::new(
            h.engine.clone(),
            h.fetcher.clone(),
            AssetStager::new(h._temp.path().join("other")),
            h.reporter.clone(),
        )
        .with_state_callback(Arc::new(move |state: &SessionState| {
            sink.lock().unwrap().push(state.as_str().to_string());
        }));

        session
            .initialize(&fixtures::engine_assets())
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["loading", "ready"]);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(SessionState::Failed {
            reason: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "boom");

        let ready = serde_json::to_value(SessionState::Ready).unwrap();
        assert_eq!(ready["state"], "ready");
    }
}
