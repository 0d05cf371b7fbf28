//! Mock transcoding engine for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use super::fixtures;
use crate::engine::{
    is_valid_entry_name, EngineError, EngineLoadConfig, EngineLog, ExecStatus, Transcoder,
};

/// Mock implementation of the Transcoder trait.
///
/// Keeps its workspace in memory. `exec` looks at the `-i` argument and the
/// last argument, and writes the configured output bytes under the latter.
///
/// # Example
///
/// ```rust,ignore
/// use audex_core::testing::MockTranscoder;
///
/// let engine = MockTranscoder::new();
/// engine.set_output(b"ID3...".to_vec()).await;
///
/// // ... run the pipeline ...
///
/// let execs = engine.recorded_execs().await;
/// assert_eq!(execs.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockTranscoder {
    /// Virtual workspace.
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    loaded: Arc<RwLock<bool>>,
    load_count: Arc<RwLock<usize>>,
    /// If set, the next `load` will fail with this error.
    next_load_error: Arc<RwLock<Option<EngineError>>>,
    /// If set, the next `exec` will fail with this error.
    next_exec_error: Arc<RwLock<Option<EngineError>>>,
    /// Status returned by every `exec`.
    exec_status: Arc<RwLock<ExecStatus>>,
    /// Bytes written to the output entry by a successful `exec`.
    output: Arc<RwLock<Vec<u8>>>,
    /// When true, a successful `exec` writes no output entry.
    skip_output: Arc<RwLock<bool>>,
    exec_delay: Arc<RwLock<Duration>>,
    load_logs: Arc<RwLock<Vec<String>>>,
    exec_logs: Arc<RwLock<Vec<String>>>,
    recorded_execs: Arc<RwLock<Vec<Vec<String>>>>,
    recorded_writes: Arc<RwLock<Vec<String>>>,
    recorded_deletes: Arc<RwLock<Vec<String>>>,
    /// Calls that touch the workspace (write, read, delete, exec).
    workspace_calls: Arc<AtomicUsize>,
    active_execs: Arc<AtomicUsize>,
    max_active_execs: Arc<AtomicUsize>,
    log_sink: StdMutex<Option<mpsc::UnboundedSender<EngineLog>>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock engine.
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            loaded: Arc::new(RwLock::new(false)),
            load_count: Arc::new(RwLock::new(0)),
            next_load_error: Arc::new(RwLock::new(None)),
            next_exec_error: Arc::new(RwLock::new(None)),
            exec_status: Arc::new(RwLock::new(ExecStatus::success())),
            output: Arc::new(RwLock::new(fixtures::sample_mp3())),
            skip_output: Arc::new(RwLock::new(false)),
            exec_delay: Arc::new(RwLock::new(Duration::ZERO)),
            load_logs: Arc::new(RwLock::new(Vec::new())),
            exec_logs: Arc::new(RwLock::new(Vec::new())),
            recorded_execs: Arc::new(RwLock::new(Vec::new())),
            recorded_writes: Arc::new(RwLock::new(Vec::new())),
            recorded_deletes: Arc::new(RwLock::new(Vec::new())),
            workspace_calls: Arc::new(AtomicUsize::new(0)),
            active_execs: Arc::new(AtomicUsize::new(0)),
            max_active_execs: Arc::new(AtomicUsize::new(0)),
            log_sink: StdMutex::new(None),
        }
    }

    /// Configure the next load to fail with the given error.
    pub async fn set_next_error(&self, error: EngineError) {
        *self.next_load_error.write().await = Some(error);
    }

    /// Configure the next exec to fail with the given error.
    pub async fn set_exec_error(&self, error: EngineError) {
        *self.next_exec_error.write().await = Some(error);
    }

    /// Set the status every exec reports.
    pub async fn set_exec_status(&self, status: ExecStatus) {
        *self.exec_status.write().await = status;
    }

    /// Set the bytes a successful exec produces.
    pub async fn set_output(&self, bytes: Vec<u8>) {
        *self.output.write().await = bytes;
    }

    pub async fn set_skip_output(&self, skip: bool) {
        *self.skip_output.write().await = skip;
    }

    pub async fn set_exec_delay(&self, delay: Duration) {
        *self.exec_delay.write().await = delay;
    }

    /// Log lines emitted while loading.
    pub async fn set_load_logs(&self, logs: Vec<String>) {
        *self.load_logs.write().await = logs;
    }

    /// Log lines emitted during every exec.
    pub async fn set_exec_logs(&self, logs: Vec<String>) {
        *self.exec_logs.write().await = logs;
    }

    /// Put an entry into the workspace directly.
    pub async fn insert_file(&self, name: &str, bytes: Vec<u8>) {
        self.files.write().await.insert(name.to_string(), bytes);
    }

    pub async fn load_count(&self) -> usize {
        *self.load_count.read().await
    }

    pub async fn is_loaded(&self) -> bool {
        *self.loaded.read().await
    }

    pub async fn recorded_execs(&self) -> Vec<Vec<String>> {
        self.recorded_execs.read().await.clone()
    }

    pub async fn recorded_writes(&self) -> Vec<String> {
        self.recorded_writes.read().await.clone()
    }

    pub async fn recorded_deletes(&self) -> Vec<String> {
        self.recorded_deletes.read().await.clone()
    }

    /// Names currently present in the workspace.
    pub async fn entry_names(&self) -> Vec<String> {
        self.files.read().await.keys().cloned().collect()
    }

    /// Number of workspace operations (write, read, delete, exec) seen so far.
    pub async fn workspace_call_count(&self) -> usize {
        self.workspace_calls.load(Ordering::SeqCst)
    }

    /// Highest number of execs that were running at the same time.
    pub async fn max_concurrent_execs(&self) -> usize {
        self.max_active_execs.load(Ordering::SeqCst)
    }

    fn emit(&self, message: &str) {
        let sink = self.log_sink.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = sink.as_ref() {
            let _ = tx.send(EngineLog::new("info", message));
        }
    }

    async fn ensure_ready(&self, name: Option<&str>) -> Result<(), EngineError> {
        self.workspace_calls.fetch_add(1, Ordering::SeqCst);
        if !*self.loaded.read().await {
            return Err(EngineError::NotLoaded);
        }
        if let Some(name) = name {
            if !is_valid_entry_name(name) {
                return Err(EngineError::InvalidEntryName {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load(&self, _config: &EngineLoadConfig) -> Result<(), EngineError> {
        *self.load_count.write().await += 1;

        for line in self.load_logs.read().await.iter() {
            self.emit(line);
        }

        if let Some(err) = self.next_load_error.write().await.take() {
            return Err(err);
        }

        *self.loaded.write().await = true;
        Ok(())
    }

    fn subscribe_logs(&self) -> mpsc::UnboundedReceiver<EngineLog> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.log_sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        rx
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        self.ensure_ready(Some(name)).await?;
        self.recorded_writes.write().await.push(name.to_string());
        self.files
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.ensure_ready(Some(name)).await?;
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::EntryNotFound {
                name: name.to_string(),
            })
    }

    async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        self.ensure_ready(Some(name)).await?;
        self.recorded_deletes.write().await.push(name.to_string());
        self.files.write().await.remove(name);
        Ok(())
    }

    async fn exec(&self, args: &[String]) -> Result<ExecStatus, EngineError> {
        self.ensure_ready(None).await?;
        self.recorded_execs.write().await.push(args.to_vec());

        let active = self.active_execs.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_execs.fetch_max(active, Ordering::SeqCst);

        let delay = *self.exec_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.active_execs.fetch_sub(1, Ordering::SeqCst);

        for line in self.exec_logs.read().await.iter() {
            self.emit(line);
        }

        if let Some(err) = self.next_exec_error.write().await.take() {
            return Err(err);
        }

        let status = self.exec_status.read().await.clone();
        if !status.is_success() {
            return Ok(status);
        }

        let input = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1));
        if let Some(input) = input {
            if !self.files.read().await.contains_key(input) {
                return Ok(ExecStatus::failure(
                    1,
                    format!("{}: No such file or directory", input),
                ));
            }
        }

        if !*self.skip_output.read().await {
            if let Some(output) = args.last() {
                let bytes = self.output.read().await.clone();
                self.files.write().await.insert(output.clone(), bytes);
            }
        }

        Ok(status)
    }
}
