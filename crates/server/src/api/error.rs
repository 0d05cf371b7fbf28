//! Error bodies and status code mapping shared by the API handlers.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use audex_core::{PipelineError, SelectError, SessionError, WorkflowError};

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Engine diagnostic text for failed conversions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            details: None,
        }),
    )
}

/// Maps a workflow error to its HTTP status and body.
pub fn workflow_error(err: &WorkflowError) -> ApiError {
    let status = match err {
        WorkflowError::Select(SelectError::InvalidInputType { .. }) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        WorkflowError::Select(SelectError::Unreadable { .. }) => StatusCode::BAD_REQUEST,
        WorkflowError::Session(SessionError::AlreadyLoading) => StatusCode::CONFLICT,
        WorkflowError::Session(SessionError::NotReady { .. }) => StatusCode::CONFLICT,
        WorkflowError::Session(SessionError::EngineLoad(_) | SessionError::Failed { .. }) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        WorkflowError::Pipeline(PipelineError::NoFileSelected) => StatusCode::BAD_REQUEST,
        WorkflowError::Pipeline(PipelineError::EngineNotReady { .. }) => StatusCode::CONFLICT,
        WorkflowError::Pipeline(PipelineError::ConversionFailed { .. }) => StatusCode::BAD_GATEWAY,
        WorkflowError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let details = match err {
        WorkflowError::Pipeline(e) => e.diagnostics().map(str::to_string),
        _ => None,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            details,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_type_is_unsupported_media() {
        let err = WorkflowError::Select(SelectError::InvalidInputType {
            expected: "video/mp4".to_string(),
            actual: "audio/mpeg".to_string(),
        });
        let (status, Json(body)) = workflow_error(&err);
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body.error, "Please select an MP4 file.");
    }

    #[test]
    fn test_no_file_is_bad_request() {
        let err = WorkflowError::Pipeline(PipelineError::NoFileSelected);
        let (status, Json(body)) = workflow_error(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Please select an MP4 file first");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_conversion_failure_carries_details() {
        let err = WorkflowError::Pipeline(PipelineError::conversion_failed(
            "engine exited with status 1",
            Some("Invalid data found when processing input".to_string()),
        ));
        let (status, Json(body)) = workflow_error(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body.details.as_deref(),
            Some("Invalid data found when processing input")
        );
    }

    #[test]
    fn test_session_errors() {
        let (status, _) = workflow_error(&WorkflowError::Session(SessionError::AlreadyLoading));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = workflow_error(&WorkflowError::Session(SessionError::Failed {
            reason: "fetch failed".to_string(),
        }));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
