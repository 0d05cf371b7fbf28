//! Configuration for the selector module.

use serde::{Deserialize, Serialize};

/// Configuration for input file selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// MIME type a candidate must declare to be accepted.
    #[serde(default = "default_accepted_type")]
    pub accepted_type: String,
}

fn default_accepted_type() -> String {
    "video/mp4".to_string()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            accepted_type: default_accepted_type(),
        }
    }
}
