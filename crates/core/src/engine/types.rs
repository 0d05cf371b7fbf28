//! Types for the engine module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which of the three engine assets a value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Engine logic (for the native engine: the ffmpeg executable).
    Core,
    /// Binary runtime (for the native engine: the ffprobe executable).
    Binary,
    /// Worker (for the native engine: a preset of extra global arguments).
    Worker,
}

impl AssetKind {
    /// Fetch order used when bootstrapping an engine.
    pub const ALL: [AssetKind; 3] = [AssetKind::Core, AssetKind::Binary, AssetKind::Worker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Binary => "binary",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an asset is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// Remote asset fetched over HTTP(S).
    Url(String),
    /// Local file, given as a `file://` URL or a plain path.
    File(PathBuf),
}

impl AssetLocation {
    /// Parses a configured location string.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            Self::File(PathBuf::from(path))
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Last path segment, used to name the staged copy.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Url(url) => url
                .split(['?', '#'])
                .next()
                .and_then(|u| u.rsplit('/').next())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssetSpecRepr {
    Location(String),
    Detailed {
        location: String,
        #[serde(default)]
        sha256: Option<String>,
    },
}

/// A configured engine asset: a location plus an optional SHA-256 pin.
///
/// In TOML either a bare string or a table is accepted:
///
/// ```toml
/// core = "/usr/bin/ffmpeg"
/// binary = { location = "https://example.org/ffprobe", sha256 = "ab12..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AssetSpecRepr")]
pub struct AssetSpec {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl From<AssetSpecRepr> for AssetSpec {
    fn from(repr: AssetSpecRepr) -> Self {
        match repr {
            AssetSpecRepr::Location(location) => Self {
                location,
                sha256: None,
            },
            AssetSpecRepr::Detailed { location, sha256 } => Self { location, sha256 },
        }
    }
}

impl AssetSpec {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }

    pub fn parsed_location(&self) -> AssetLocation {
        AssetLocation::parse(&self.location)
    }
}

/// The three assets an engine needs before it can load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineAssets {
    pub core: AssetSpec,
    pub binary: AssetSpec,
    pub worker: AssetSpec,
}

impl EngineAssets {
    pub fn get(&self, kind: AssetKind) -> &AssetSpec {
        match kind {
            AssetKind::Core => &self.core,
            AssetKind::Binary => &self.binary,
            AssetKind::Worker => &self.worker,
        }
    }
}

/// Bytes of a fetched asset, before staging.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub kind: AssetKind,
    pub location: String,
    pub bytes: Vec<u8>,
    /// Lowercase hex SHA-256 of `bytes`.
    pub sha256: String,
}

/// An asset written somewhere the engine can load it from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedAsset {
    pub kind: AssetKind,
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
}

/// What `Transcoder::load` receives: one staged address per asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLoadConfig {
    pub core: StagedAsset,
    pub binary: StagedAsset,
    pub worker: StagedAsset,
}

/// A single log line emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLog {
    /// Log channel, e.g. "stderr" or "info".
    pub kind: String,
    pub message: String,
}

impl EngineLog {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Completion status of a command run by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStatus {
    pub exit_code: i32,
    /// Error lines captured while the command ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl ExecStatus {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            diagnostics: None,
        }
    }

    pub fn failure(exit_code: i32, diagnostics: impl Into<String>) -> Self {
        Self {
            exit_code,
            diagnostics: Some(diagnostics.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Validates a virtual workspace entry name.
///
/// Entries live in a flat namespace, so separators, parent references and
/// empty names are refused.
pub fn is_valid_entry_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
