//! Extraction workflow integration tests.
//!
//! These tests drive the workflow end to end with a mock engine:
//! - File selection and rejection
//! - Extraction preconditions (no file, engine not ready)
//! - Successful extraction and delivery
//! - Failure handling without delivery

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use audex_core::{
    delivery::{DirectoryDelivery, OutputDelivery},
    pipeline::PipelineError,
    selector::{FileCandidate, SelectError},
    session::SessionState,
    status::{FanoutReporter, LatestStatus},
    testing::{fixtures, MockAssetFetcher, MockDelivery, MockTranscoder, RecordingReporter},
    engine::{EngineError, ExecStatus},
    ExtractionWorkflow, WorkflowError,
};

/// Test helper wiring a workflow around mocks.
struct TestHarness {
    workflow: ExtractionWorkflow,
    engine: Arc<MockTranscoder>,
    fetcher: Arc<MockAssetFetcher>,
    reporter: Arc<RecordingReporter>,
    latest: LatestStatus,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = fixtures::config(temp_dir.path());

        let engine = Arc::new(MockTranscoder::new());
        let fetcher = Arc::new(MockAssetFetcher::with_assets(&config.engine.assets));
        let reporter = Arc::new(RecordingReporter::new());
        let latest = LatestStatus::new();
        let status = FanoutReporter::new()
            .with(reporter.clone())
            .with(Arc::new(latest.clone()));

        let workflow = ExtractionWorkflow::from_config(
            &config,
            engine.clone(),
            fetcher.clone(),
            Arc::new(status),
        );

        Self {
            workflow,
            engine,
            fetcher,
            reporter,
            latest,
            temp_dir,
        }
    }

    async fn ready() -> Self {
        let harness = Self::new();
        harness
            .workflow
            .load_engine()
            .await
            .expect("Engine should load");
        harness
    }

    async fn write_sample(&self, name: &str) -> std::path::PathBuf {
        let path = self.temp_dir.path().join(name);
        tokio::fs::write(&path, fixtures::sample_mp4())
            .await
            .expect("Failed to write sample");
        path
    }
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn test_non_mp4_candidates_rejected_without_changing_selection() {
    let h = TestHarness::new();
    h.workflow
        .select_file(fixtures::mp4_candidate("keep.mp4"))
        .await
        .unwrap();

    let candidates = [
        ("song.mp3", "audio/mpeg"),
        ("clip.webm", "video/webm"),
        ("clip.mkv", "video/x-matroska"),
        ("notes.txt", "text/plain"),
        ("empty", ""),
    ];

    for (name, mime) in candidates {
        let err = h
            .workflow
            .select_file(FileCandidate::from_bytes(name, mime, vec![1, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Select(SelectError::InvalidInputType { .. })
        ));
        assert_eq!(h.workflow.current_file().await.unwrap().name, "keep.mp4");
    }
}

#[tokio::test]
async fn test_select_from_disk_infers_type() {
    let h = TestHarness::new();
    let mp4 = h.write_sample("sample.mp4").await;
    let mov = h.write_sample("sample.mov").await;

    let candidate = FileCandidate::from_path(&mov).await.unwrap();
    assert!(h.workflow.select_file(candidate).await.is_err());

    let candidate = FileCandidate::from_path(&mp4).await.unwrap();
    let file = h.workflow.select_file(candidate).await.unwrap();
    assert_eq!(file.mime_type, "video/mp4");
}

// =============================================================================
// Preconditions
// =============================================================================

#[tokio::test]
async fn test_extract_without_file_never_contacts_engine() {
    let h = TestHarness::ready().await;

    let err = h.workflow.extract_audio().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Pipeline(PipelineError::NoFileSelected)
    ));
    assert_eq!(h.engine.workspace_call_count().await, 0);
    assert!(h.engine.recorded_execs().await.is_empty());
}

#[tokio::test]
async fn test_extract_before_engine_load() {
    let h = TestHarness::new();
    h.workflow
        .select_file(fixtures::mp4_candidate("sample.mp4"))
        .await
        .unwrap();

    let err = h.workflow.extract_audio().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Pipeline(PipelineError::EngineNotReady {
            state: SessionState::Unloaded
        })
    ));
    assert_eq!(h.engine.workspace_call_count().await, 0);
}

// =============================================================================
// Extraction
// =============================================================================

#[tokio::test]
async fn test_extract_returns_mocked_output() {
    let h = TestHarness::ready().await;
    let mp3 = b"ID3\x04\x00fixed-output".to_vec();
    h.engine.set_output(mp3.clone()).await;
    h.workflow
        .select_file(fixtures::mp4_candidate("sample.mp4"))
        .await
        .unwrap();

    let result = h.workflow.extract_audio().await.unwrap();
    assert_eq!(result.bytes(), mp3.as_slice());
    assert_eq!(result.mime_type(), "audio/mp3");
}

#[tokio::test]
async fn test_repeated_extraction_is_idempotent() {
    let h = TestHarness::ready().await;
    h.workflow
        .select_file(fixtures::mp4_candidate("sample.mp4"))
        .await
        .unwrap();

    let first = h.workflow.extract_audio().await.unwrap();
    let second = h.workflow.extract_audio().await.unwrap();
    let third = h.workflow.extract_audio().await.unwrap();

    assert_eq!(first.bytes(), second.bytes());
    assert_eq!(second.bytes(), third.bytes());
    assert_eq!(h.engine.recorded_execs().await.len(), 3);
    assert!(h.engine.entry_names().await.is_empty());
}

#[tokio::test]
async fn test_exec_rejection_surfaces_conversion_failed_without_delivery() {
    let h = TestHarness::ready().await;
    let delivery = MockDelivery::new();
    h.workflow
        .select_file(fixtures::mp4_candidate("sample.mp4"))
        .await
        .unwrap();
    h.engine
        .set_exec_error(EngineError::exec_failed(
            "engine terminated",
            Some("Aborted()".to_string()),
        ))
        .await;

    let err = h.workflow.extract_and_deliver(&delivery).await.unwrap_err();
    match err {
        WorkflowError::Pipeline(PipelineError::ConversionFailed { diagnostics, .. }) => {
            assert_eq!(diagnostics.as_deref(), Some("Aborted()"));
        }
        other => panic!("expected ConversionFailed, got {:?}", other),
    }
    assert_eq!(delivery.delivery_count().await, 0);

    // The failure text reached the status reporters
    let latest = h.latest.latest().unwrap();
    assert!(latest.message.contains("engine terminated"));
    assert_eq!(h.reporter.last().unwrap(), latest.message);
}

#[tokio::test]
async fn test_failed_attempt_does_not_block_next_one() {
    let h = TestHarness::ready().await;
    h.workflow
        .select_file(fixtures::mp4_candidate("sample.mp4"))
        .await
        .unwrap();

    h.engine
        .set_exec_status(ExecStatus::failure(1, "Conversion failed!"))
        .await;
    assert!(h.workflow.extract_audio().await.is_err());

    h.engine.set_exec_status(ExecStatus::success()).await;
    assert!(h.workflow.extract_audio().await.is_ok());
}

#[tokio::test]
async fn test_exec_logs_reach_status() {
    let h = TestHarness::ready().await;
    h.engine
        .set_exec_logs(vec![
            "Stream #0:1(und): Audio: aac".to_string(),
            "size=     512kB time=00:00:32.00".to_string(),
        ])
        .await;
    h.workflow
        .select_file(fixtures::mp4_candidate("sample.mp4"))
        .await
        .unwrap();

    h.workflow.extract_audio().await.unwrap();

    assert!(h.reporter.wait_for_count(2, Duration::from_secs(2)).await);
    let messages = h.reporter.messages();
    assert_eq!(messages[0], "Stream #0:1(und): Audio: aac");
    assert_eq!(messages[1], "size=     512kB time=00:00:32.00");
}

// =============================================================================
// End to end
// =============================================================================

#[tokio::test]
async fn test_end_to_end_sample_to_saved_artifact() {
    let h = TestHarness::new();
    let out_dir = h.temp_dir.path().join("downloads");
    let delivery = DirectoryDelivery::new(&out_dir);

    // Select sample.mp4
    let sample = h.write_sample("sample.mp4").await;
    let candidate = FileCandidate::from_path(&sample).await.unwrap();
    assert_eq!(candidate.mime_type, "video/mp4");
    h.workflow.select_file(candidate).await.unwrap();

    // Load engine
    h.workflow.load_engine().await.unwrap();
    assert_eq!(h.workflow.engine_state().await, SessionState::Ready);
    assert_eq!(h.fetcher.fetch_count().await, 3);

    // Extract and save
    let (result, receipt) = h.workflow.extract_and_deliver(&delivery).await.unwrap();
    assert_eq!(delivery.name(), "directory");
    assert_eq!(receipt.filename, "extracted_audio.mp3");
    assert_eq!(receipt.mime_type, "audio/mp3");

    let saved = tokio::fs::read(out_dir.join("extracted_audio.mp3"))
        .await
        .unwrap();
    assert_eq!(saved, result.bytes());
    assert_eq!(saved, fixtures::sample_mp3());
}
