//! Types for the delivery module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Proof that a result was delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub request_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
    /// Where the file landed, for deliveries that write to disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    pub delivered_at: DateTime<Utc>,
}

/// Whether `filename` is a single plain path component.
pub fn is_valid_filename(filename: &str) -> bool {
    !filename.trim().is_empty()
        && filename != "."
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_validation() {
        assert!(is_valid_filename("extracted_audio.mp3"));
        assert!(is_valid_filename("my song.mp3"));
        assert!(!is_valid_filename(""));
        assert!(!is_valid_filename("  "));
        assert!(!is_valid_filename("../escape.mp3"));
        assert!(!is_valid_filename("dir/file.mp3"));
        assert!(!is_valid_filename("dir\\file.mp3"));
    }
}
