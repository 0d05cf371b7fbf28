//! Configuration for output delivery.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for delivering extracted audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// File name offered for save.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// When set, every result is also saved into this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
}

fn default_filename() -> String {
    "extracted_audio.mp3".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            save_dir: None,
        }
    }
}
