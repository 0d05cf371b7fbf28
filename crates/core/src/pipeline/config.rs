//! Configuration for the conversion pipeline.

use serde::{Deserialize, Serialize};

/// Highest value on the LAME VBR quality scale (lowest quality).
pub const MAX_QUALITY: u8 = 9;

/// Configuration for audio extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// MP3 VBR quality, 0 (best) to 9 (smallest).
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Use per-request workspace entry names instead of `input.mp4`/`output.mp3`.
    #[serde(default = "default_true")]
    pub scoped_entries: bool,

    /// Delete workspace entries after each attempt.
    #[serde(default = "default_true")]
    pub cleanup_workspace: bool,
}

fn default_quality() -> u8 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            scoped_entries: true,
            cleanup_workspace: true,
        }
    }
}
