//! Trait definitions for the engine module.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::EngineError;
use super::types::{AssetKind, AssetSpec, EngineLoadConfig, EngineLog, ExecStatus, FetchedAsset};

/// An external transcoding engine with an isolated virtual workspace.
///
/// The engine is opaque: callers move bytes in with `write_file`, run a
/// command line with `exec`, and move bytes out with `read_file`.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Loads the engine from its staged assets. Resolves once the engine is ready.
    async fn load(&self, config: &EngineLoadConfig) -> Result<(), EngineError>;

    /// Subscribes to engine log messages.
    ///
    /// Only one subscriber is active at a time; subscribing again replaces the
    /// previous sink, whose receiver then observes a closed channel.
    fn subscribe_logs(&self) -> mpsc::UnboundedReceiver<EngineLog>;

    /// Writes an entry into the virtual workspace, replacing any entry of that name.
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError>;

    /// Reads an entry from the virtual workspace.
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Removes an entry from the virtual workspace. Missing entries are not an error.
    async fn delete_file(&self, name: &str) -> Result<(), EngineError>;

    /// Runs a command line inside the engine and waits for it to finish.
    async fn exec(&self, args: &[String]) -> Result<ExecStatus, EngineError>;
}

/// Fetches engine assets as raw bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Fetches one asset. A configured SHA-256 pin must match.
    async fn fetch(&self, kind: AssetKind, spec: &AssetSpec) -> Result<FetchedAsset, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    struct EchoTranscoder {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl Transcoder for EchoTranscoder {
        fn name(&self) -> &str {
            "echo"
        }

        async fn load(&self, _config: &EngineLoadConfig) -> Result<(), EngineError> {
            Ok(())
        }

        fn subscribe_logs(&self) -> mpsc::UnboundedReceiver<EngineLog> {
            let (_tx, rx) = mpsc::unbounded_channel();
            rx
        }

        async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
            self.files
                .lock()
                .await
                .insert(name.to_string(), bytes.to_vec());
            Ok(())
        }

        async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
            self.files
                .lock()
                .await
                .get(name)
                .cloned()
                .ok_or_else(|| EngineError::EntryNotFound {
                    name: name.to_string(),
                })
        }

        async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
            self.files.lock().await.remove(name);
            Ok(())
        }

        async fn exec(&self, _args: &[String]) -> Result<ExecStatus, EngineError> {
            Ok(ExecStatus::success())
        }
    }

    #[tokio::test]
    async fn test_workspace_round_trip_through_trait_object() {
        let engine: Box<dyn Transcoder> = Box::new(EchoTranscoder {
            files: Mutex::new(HashMap::new()),
        });

        engine.write_file("input.mp4", b"one").await.unwrap();
        engine.write_file("input.mp4", b"two").await.unwrap();
        assert_eq!(engine.read_file("input.mp4").await.unwrap(), b"two");

        engine.delete_file("input.mp4").await.unwrap();
        assert!(matches!(
            engine.read_file("input.mp4").await,
            Err(EngineError::EntryNotFound { .. })
        ));
    }
}
