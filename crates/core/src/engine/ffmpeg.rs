//! FFmpeg-based engine implementation.
//!
//! The virtual workspace is a private directory; commands run with that
//! directory as their working directory so entry names resolve inside it.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex as StdMutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::error::EngineError;
use super::traits::Transcoder;
use super::types::{is_valid_entry_name, EngineLoadConfig, EngineLog, ExecStatus};

/// Lines of stderr kept for diagnostics when a command fails.
const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// Executables and preset resolved by a successful `load`.
#[derive(Debug, Clone)]
struct LoadedEngine {
    ffmpeg: PathBuf,
    preset_args: Vec<String>,
}

/// Native engine driving an ffmpeg executable.
pub struct FfmpegEngine {
    config: EngineConfig,
    loaded: RwLock<Option<LoadedEngine>>,
    log_sink: StdMutex<Option<mpsc::UnboundedSender<EngineLog>>>,
}

impl FfmpegEngine {
    /// Creates an unloaded engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            loaded: RwLock::new(None),
            log_sink: StdMutex::new(None),
        }
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.config.workspace_dir
    }

    /// Parses a worker preset: one or more arguments per line, `#` starts a comment.
    fn parse_preset(contents: &str) -> Vec<String> {
        contents
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .flat_map(|line| line.split_whitespace().map(str::to_string))
            .collect()
    }

    /// Builds the full ffmpeg argument list for a command.
    fn build_args(&self, preset_args: &[String], args: &[String]) -> Vec<String> {
        let mut full = vec![
            "-nostdin".to_string(),
            "-y".to_string(), // Overwrite existing output entries
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ];
        full.extend(preset_args.iter().cloned());
        full.extend(args.iter().cloned());
        full
    }

    fn emit(&self, log: EngineLog) {
        let sink = self.log_sink.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = sink.as_ref() {
            // Receiver gone just means no one is listening
            let _ = tx.send(log);
        }
    }

    async fn loaded(&self) -> Result<LoadedEngine, EngineError> {
        self.loaded.read().await.clone().ok_or(EngineError::NotLoaded)
    }

    fn entry_path(&self, name: &str) -> Result<PathBuf, EngineError> {
        if !is_valid_entry_name(name) {
            return Err(EngineError::InvalidEntryName {
                name: name.to_string(),
            });
        }
        Ok(self.config.workspace_dir.join(name))
    }

    /// Runs `<program> -version` and returns the first line of its output.
    async fn probe_version(program: &Path) -> Result<String, EngineError> {
        let output = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                EngineError::load_rejected(format!("cannot run {}: {}", program.display(), e))
            })?;

        if !output.status.success() {
            return Err(EngineError::load_rejected(format!(
                "{} -version exited with code {:?}",
                program.display(),
                output.status.code()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or("").trim().to_string())
    }
}

#[async_trait]
impl Transcoder for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn load(&self, config: &EngineLoadConfig) -> Result<(), EngineError> {
        // exec runs inside the workspace, so a relative path would no longer resolve
        let ffmpeg = std::path::absolute(&config.core.path).map_err(|e| {
            EngineError::load_rejected(format!(
                "cannot resolve {}: {}",
                config.core.path.display(),
                e
            ))
        })?;

        let ffprobe_version = Self::probe_version(&config.binary.path).await?;
        let ffmpeg_version = Self::probe_version(&ffmpeg).await?;

        let preset = tokio::fs::read(&config.worker.path).await.map_err(|e| {
            EngineError::load_rejected(format!(
                "cannot read worker preset {}: {}",
                config.worker.path.display(),
                e
            ))
        })?;
        let preset = String::from_utf8(preset)
            .map_err(|_| EngineError::load_rejected("worker preset is not valid UTF-8"))?;
        let preset_args = Self::parse_preset(&preset);

        tokio::fs::create_dir_all(&self.config.workspace_dir).await?;

        self.emit(EngineLog::new("info", ffmpeg_version.clone()));
        info!(
            ffmpeg = %ffmpeg_version,
            ffprobe = %ffprobe_version,
            preset_args = preset_args.len(),
            workspace = %self.config.workspace_dir.display(),
            "FFmpeg engine loaded"
        );

        *self.loaded.write().await = Some(LoadedEngine {
            ffmpeg,
            preset_args,
        });
        Ok(())
    }

    fn subscribe_logs(&self) -> mpsc::UnboundedReceiver<EngineLog> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sink = self.log_sink.lock().unwrap_or_else(|e| e.into_inner());
        *sink = Some(tx);
        rx
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), EngineError> {
        self.loaded().await?;
        let path = self.entry_path(name)?;
        tokio::fs::write(&path, bytes).await?;
        debug!(entry = name, size = bytes.len(), "Wrote workspace entry");
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.loaded().await?;
        let path = self.entry_path(name)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::EntryNotFound {
                    name: name.to_string(),
                }
            } else {
                EngineError::Io(e)
            }
        })
    }

    async fn delete_file(&self, name: &str) -> Result<(), EngineError> {
        self.loaded().await?;
        let path = self.entry_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngineError::Io(e)),
        }
    }

    async fn exec(&self, args: &[String]) -> Result<ExecStatus, EngineError> {
        let engine = self.loaded().await?;
        let full_args = self.build_args(&engine.preset_args, args);
        debug!(args = ?full_args, "Running ffmpeg");

        let mut child = Command::new(&engine.ffmpeg)
            .args(&full_args)
            .current_dir(&self.config.workspace_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::exec_failed(
                    format!("failed to spawn {}: {}", engine.ffmpeg.display(), e),
                    None,
                )
            })?;

        let mut tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_TAIL_LINES);
        if let Some(stderr) = child.stderr.take() {
            // Metadata echoed from the input may not be UTF-8
            let mut lines = BufReader::new(stderr).split(b'\n');
            while let Ok(Some(raw)) = lines.next_segment().await {
                let line = String::from_utf8_lossy(&raw).trim_end_matches('\r').to_string();
                if tail.len() == DIAGNOSTIC_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.clone());
                self.emit(EngineLog::new("stderr", line));
            }
        }

        let status = child.wait().await?;
        let exit_code = status.code().unwrap_or(-1);

        if status.success() {
            Ok(ExecStatus::success())
        } else {
            warn!(exit_code, "ffmpeg exited with failure");
            Ok(ExecStatus::failure(
                exit_code,
                tail.into_iter().collect::<Vec<_>>().join("\n"),
            ))
        }
    }
}
