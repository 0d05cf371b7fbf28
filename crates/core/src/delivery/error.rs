//! Error types for the delivery module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while delivering a result.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Delivery filenames must be a single plain path component.
    #[error("Invalid delivery filename: {filename:?}")]
    InvalidFilename { filename: String },

    /// The target directory could not be created.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the transient file failed.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving the transient file into place failed.
    #[error("Failed to move {source} to {destination}")]
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },
}
