//! Error types for the engine module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::AssetKind;

/// Errors raised by a transcoding engine or while fetching its assets.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation was attempted before `load` succeeded.
    #[error("Engine is not loaded")]
    NotLoaded,

    /// An asset could not be fetched.
    #[error("Failed to fetch {kind} asset from {location}: {reason}")]
    AssetFetchFailed {
        kind: AssetKind,
        location: String,
        reason: String,
    },

    /// A fetched asset did not match its pinned digest.
    #[error("Checksum mismatch for {kind} asset: expected {expected}, got {actual}")]
    AssetChecksumMismatch {
        kind: AssetKind,
        expected: String,
        actual: String,
    },

    /// A fetched asset could not be written to the staging directory.
    #[error("Failed to stage {kind} asset at {path}")]
    StagingFailed {
        kind: AssetKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected its load configuration.
    #[error("Engine rejected initialization: {reason}")]
    LoadRejected { reason: String },

    /// Workspace entry names are flat; this one is not.
    #[error("Invalid workspace entry name: {name:?}")]
    InvalidEntryName { name: String },

    /// A workspace entry was read but does not exist.
    #[error("Workspace entry not found: {name}")]
    EntryNotFound { name: String },

    /// The engine could not run a command.
    #[error("Command execution failed: {reason}")]
    ExecFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// I/O error inside the engine.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn fetch_failed(kind: AssetKind, location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AssetFetchFailed {
            kind,
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn load_rejected(reason: impl Into<String>) -> Self {
        Self::LoadRejected {
            reason: reason.into(),
        }
    }

    pub fn exec_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExecFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Engine-provided diagnostic text, when there is any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ExecFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
