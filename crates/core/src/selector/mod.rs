//! Selector module: accepts exactly one MP4 input file at a time.

mod config;
mod error;
mod file_selector;
mod types;

pub use config::SelectorConfig;
pub use error::SelectError;
pub use file_selector::FileSelector;
pub use types::{mime_for_extension, FileCandidate, MediaFile, MediaSource};
