//! Error types for the selector module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while selecting an input file.
#[derive(Debug, Error)]
pub enum SelectError {
    /// The candidate's declared type is not the accepted one.
    #[error("{}", select_prompt(expected))]
    InvalidInputType { expected: String, actual: String },

    /// A file on disk could not be inspected or read.
    #[error("Failed to read {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// User-facing prompt naming the accepted type, e.g. "Please select an MP4 file."
fn select_prompt(expected: &str) -> String {
    let essence = expected.split(';').next().unwrap_or("").trim();
    let label = match essence.to_ascii_lowercase().as_str() {
        "video/mp4" => "an MP4",
        "video/webm" => "a WebM",
        "video/quicktime" => "a MOV",
        "video/x-matroska" => "an MKV",
        _ => return format!("Please select a file of type {}.", essence),
    };
    format!("Please select {} file.", label)
}
