//! Error types for the session module.

use thiserror::Error;

use super::session::SessionState;
use crate::engine::EngineError;

/// Errors surfaced by the engine session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Bootstrap failed. The session is now `Failed` and will not retry.
    #[error("Engine failed to load: {0}")]
    EngineLoad(#[source] EngineError),

    /// `initialize` was called while a bootstrap is already running.
    #[error("Engine is already loading")]
    AlreadyLoading,

    /// A previous bootstrap failed; a fresh process is needed to load again.
    #[error("Engine failed to load earlier ({reason}); restart to try again")]
    Failed { reason: String },

    /// The engine was requested before reaching `Ready`.
    #[error("Engine is not ready (state: {state})")]
    NotReady { state: SessionState },
}

impl SessionError {
    /// Whether this error is the `EngineLoadError` kind.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::EngineLoad(_) | Self::Failed { .. })
    }
}
