use tokio::sync::RwLock;
use tracing::{debug, info};

use super::config::SelectorConfig;
use super::error::SelectError;
use super::types::{FileCandidate, MediaFile};
use crate::metrics::FILE_SELECTIONS_TOTAL;

/// Holds the currently selected input file.
///
/// A candidate is accepted only if its declared MIME type matches the
/// configured one; a rejected candidate leaves the current selection as it
/// was.
#[derive(Debug)]
pub struct FileSelector {
    accepted_type: String,
    current: RwLock<Option<MediaFile>>,
}

impl FileSelector {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            accepted_type: config.accepted_type.clone(),
            current: RwLock::new(None),
        }
    }

    pub fn accepted_type(&self) -> &str {
        &self.accepted_type
    }

    /// Validates the candidate and makes it the current selection.
    pub async fn select(&self, candidate: FileCandidate) -> Result<MediaFile, SelectError> {
        if !mime_matches(&candidate.mime_type, &self.accepted_type) {
            FILE_SELECTIONS_TOTAL.with_label_values(&["rejected"]).inc();
            debug!(
                name = %candidate.name,
                mime_type = %candidate.mime_type,
                "Rejected input file"
            );
            return Err(SelectError::InvalidInputType {
                expected: self.accepted_type.clone(),
                actual: candidate.mime_type,
            });
        }

        let file = MediaFile::from_candidate(candidate);
        *self.current.write().await = Some(file.clone());
        FILE_SELECTIONS_TOTAL.with_label_values(&["accepted"]).inc();
        info!(name = %file.name, size_bytes = file.size_bytes, "Selected input file");
        Ok(file)
    }

    /// The current selection, if any.
    pub async fn current(&self) -> Option<MediaFile> {
        self.current.read().await.clone()
    }

    /// Drops the current selection.
    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}

/// Case-insensitive comparison of the essence (type/subtype), ignoring parameters.
fn mime_matches(declared: &str, accepted: &str) -> bool {
    fn essence(mime: &str) -> &str {
        mime.split(';').next().unwrap_or("").trim()
    }
    essence(declared).eq_ignore_ascii_case(essence(accepted))
}
