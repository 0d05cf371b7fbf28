//! Types for the selector module.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::SelectError;

/// Guesses a MIME type from a file extension.
///
/// Only the container types the workflow deals with are known; anything else
/// is `application/octet-stream`.
pub fn mime_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mp3" => "audio/mpeg",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Where the bytes of a media file live.
#[derive(Clone)]
pub enum MediaSource {
    /// Held in memory, e.g. an uploaded body.
    Memory(Arc<Vec<u8>>),
    /// A file on the local filesystem, read on demand.
    Path(PathBuf),
}

impl fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

/// A file offered for selection, not yet validated.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    pub size_bytes: u64,
    pub source: MediaSource,
}

impl FileCandidate {
    /// A candidate backed by an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            source: MediaSource::Memory(Arc::new(bytes)),
        }
    }

    /// A candidate backed by a local file. The MIME type is taken from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| SelectError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            name,
            mime_type: mime_for_extension(path).to_string(),
            size_bytes: metadata.len(),
            source: MediaSource::Path(path.to_path_buf()),
        })
    }
}

/// The accepted input file: opaque bytes plus a name and declared type.
///
/// Cloning is cheap; in-memory contents are shared.
#[derive(Debug, Clone, Serialize)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(skip)]
    source: MediaSource,
}

impl MediaFile {
    pub(crate) fn from_candidate(candidate: FileCandidate) -> Self {
        Self {
            name: candidate.name,
            mime_type: candidate.mime_type,
            size_bytes: candidate.size_bytes,
            source: candidate.source,
        }
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    /// Loads the full contents.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, SelectError> {
        match &self.source {
            MediaSource::Memory(bytes) => Ok(bytes.as_ref().clone()),
            MediaSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| SelectError::Unreadable {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_for_extension(Path::new("CLIP.MP4")), "video/mp4");
        assert_eq!(mime_for_extension(Path::new("clip.m4v")), "video/mp4");
        assert_eq!(mime_for_extension(Path::new("song.mp3")), "audio/mpeg");
        assert_eq!(mime_for_extension(Path::new("clip.mkv")), "video/x-matroska");
        assert_eq!(
            mime_for_extension(Path::new("notes")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_candidate_from_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("holiday.mp4");
        tokio::fs::write(&path, b"ftypisom").await.unwrap();

        let candidate = FileCandidate::from_path(&path).await.unwrap();
        assert_eq!(candidate.name, "holiday.mp4");
        assert_eq!(candidate.mime_type, "video/mp4");
        assert_eq!(candidate.size_bytes, 8);

        let file = MediaFile::from_candidate(candidate);
        assert_eq!(file.read_bytes().await.unwrap(), b"ftypisom");
    }

    #[tokio::test]
    async fn test_candidate_from_missing_path() {
        let result = FileCandidate::from_path("/nonexistent/clip.mp4").await;
        assert!(matches!(result, Err(SelectError::Unreadable { .. })));
    }

    #[test]
    fn test_media_file_serializes_without_contents() {
        let file = MediaFile::from_candidate(FileCandidate::from_bytes(
            "a.mp4",
            "video/mp4",
            vec![1, 2, 3],
        ));
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["name"], "a.mp4");
        assert_eq!(json["size_bytes"], 3);
        assert!(json.get("source").is_none());
    }
}
