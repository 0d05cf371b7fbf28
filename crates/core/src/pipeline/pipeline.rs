use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::ConversionConfig;
use super::error::PipelineError;
use super::types::{ConversionRequest, ConversionResult};
use crate::engine::{EngineError, Transcoder};
use crate::metrics::{CONVERSIONS_TOTAL, CONVERSION_DURATION};
use crate::selector::MediaFile;
use crate::session::{SessionError, TranscoderSession};
use crate::status::StatusReporter;

/// Runs one extraction: input bytes in, engine command, MP3 bytes out.
pub struct ConversionPipeline {
    config: ConversionConfig,
    status: Arc<dyn StatusReporter>,
}

impl ConversionPipeline {
    pub fn new(config: ConversionConfig, status: Arc<dyn StatusReporter>) -> Self {
        Self { config, status }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Builds the request for the next attempt.
    pub fn next_request(&self) -> ConversionRequest {
        let request = if self.config.scoped_entries {
            ConversionRequest::scoped(Uuid::new_v4())
        } else {
            ConversionRequest::fixed()
        };
        request.with_quality(self.config.quality)
    }

    /// Extracts the audio track of `file` as MP3.
    ///
    /// With no file the engine is never contacted. Every failure after that
    /// point is a `ConversionFailed`, also reported to the status reporter.
    pub async fn extract_audio(
        &self,
        session: &TranscoderSession,
        file: Option<&MediaFile>,
    ) -> Result<ConversionResult, PipelineError> {
        let Some(file) = file else {
            CONVERSIONS_TOTAL.with_label_values(&["no_file"]).inc();
            return Err(PipelineError::NoFileSelected);
        };

        let engine = match session.engine().await {
            Ok(engine) => engine,
            Err(SessionError::NotReady { state }) => {
                CONVERSIONS_TOTAL.with_label_values(&["not_ready"]).inc();
                return Err(PipelineError::EngineNotReady { state });
            }
            Err(_) => {
                CONVERSIONS_TOTAL.with_label_values(&["not_ready"]).inc();
                return Err(PipelineError::EngineNotReady {
                    state: session.state().await,
                });
            }
        };

        let request = self.next_request();
        info!(
            request_id = %request.request_id,
            file = %file.name,
            input = %request.input_name,
            output = %request.output_name,
            quality = request.quality,
            "Starting audio extraction"
        );

        let start = Instant::now();
        let outcome = self.run(engine.as_ref(), &request, file).await;

        if self.config.cleanup_workspace {
            self.cleanup(engine.as_ref(), &request).await;
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        CONVERSION_DURATION.observe(start.elapsed().as_secs_f64());

        match outcome {
            Ok(bytes) => {
                CONVERSIONS_TOTAL.with_label_values(&["success"]).inc();
                info!(
                    request_id = %request.request_id,
                    output_bytes = bytes.len(),
                    duration_ms,
                    "Audio extraction complete"
                );
                Ok(ConversionResult::new(
                    request.request_id,
                    bytes,
                    file.size_bytes,
                    duration_ms,
                ))
            }
            Err(e) => {
                CONVERSIONS_TOTAL.with_label_values(&["failed"]).inc();
                warn!(request_id = %request.request_id, error = %e, "Audio extraction failed");
                self.status.report(&match e.diagnostics() {
                    Some(diag) => format!("{}\n{}", e, diag),
                    None => e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        engine: &dyn Transcoder,
        request: &ConversionRequest,
        file: &MediaFile,
    ) -> Result<Vec<u8>, PipelineError> {
        let input = file
            .read_bytes()
            .await
            .map_err(|e| PipelineError::conversion_failed(e.to_string(), None))?;

        engine
            .write_file(&request.input_name, &input)
            .await
            .map_err(|e| engine_failure("Failed to write input", e))?;
        drop(input);

        let args = request.to_args();
        debug!(request_id = %request.request_id, args = ?args, "Executing engine command");

        let status = engine
            .exec(&args)
            .await
            .map_err(|e| engine_failure("Engine command failed", e))?;

        if !status.is_success() {
            return Err(PipelineError::conversion_failed(
                format!("Engine exited with code {}", status.exit_code),
                status.diagnostics,
            ));
        }

        let output = engine
            .read_file(&request.output_name)
            .await
            .map_err(|e| engine_failure("Failed to read output", e))?;

        if output.is_empty() {
            return Err(PipelineError::conversion_failed(
                "Engine produced an empty output",
                None,
            ));
        }

        Ok(output)
    }

    async fn cleanup(&self, engine: &dyn Transcoder, request: &ConversionRequest) {
        for name in [&request.input_name, &request.output_name] {
            if let Err(e) = engine.delete_file(name).await {
                warn!(
                    request_id = %request.request_id,
                    entry = %name,
                    error = %e,
                    "Failed to remove workspace entry"
                );
            }
        }
    }
}

fn engine_failure(context: &str, error: EngineError) -> PipelineError {
    let diagnostics = error.diagnostics().map(|d| d.to_string());
    PipelineError::conversion_failed(format!("{}: {}", context, error), diagnostics)
}
