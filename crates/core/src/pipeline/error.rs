//! Error types for the pipeline module.

use thiserror::Error;

use crate::session::SessionState;

/// Errors raised while extracting audio.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extraction was requested with nothing selected. The engine is not touched.
    #[error("Please select an MP4 file first")]
    NoFileSelected,

    /// The session has not reached `Ready`.
    #[error("Engine is not ready (state: {state})")]
    EngineNotReady { state: SessionState },

    /// A step of the conversion failed. No output is produced.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        /// Diagnostic text reported by the engine, if any.
        diagnostics: Option<String>,
    },
}

impl PipelineError {
    pub fn conversion_failed(reason: impl Into<String>, diagnostics: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            diagnostics,
        }
    }

    /// Engine diagnostic text, when the failure carries any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ConversionFailed { diagnostics, .. } => diagnostics.as_deref(),
            _ => None,
        }
    }
}
