//! Mapping of domain errors onto HTTP responses.
//!
//! Every failure leaves the server as
//! `{"category": ..., "detail": ..., "raw_output"?: ...}`.  Only malformed
//! model output carries `raw_output`; nothing else from inside the process
//! is exposed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::draft::DraftError;
use crate::llm::LlmError;
use crate::transcribe::TranscribeError;

#[derive(Debug)]
pub enum ApiError {
    Draft(DraftError),
    Transcribe(TranscribeError),
    /// The request body could not be read into the expected shape.
    /// `status` is the one the extractor chose (400, 413, 415, 422).
    Rejected { status: StatusCode, detail: String },
    Unauthorized,
    /// Never shown to the caller; logged at the boundary.
    Internal(String),
}

impl From<DraftError> for ApiError {
    fn from(e: DraftError) -> Self {
        ApiError::Draft(e)
    }
}

impl From<TranscribeError> for ApiError {
    fn from(e: TranscribeError) -> Self {
        ApiError::Transcribe(e)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub category: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl ApiError {
    pub fn rejected(status: StatusCode, detail: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            detail: detail.into(),
        }
    }

    /// Status code and body for this error.
    pub fn parts(&self) -> (StatusCode, ErrorBody) {
        let body = |category, detail: String| ErrorBody {
            category,
            detail,
            raw_output: None,
        };

        match self {
            ApiError::Draft(DraftError::InvalidRequest(e)) => {
                (StatusCode::BAD_REQUEST, body("invalid_request", e.to_string()))
            }
            ApiError::Draft(DraftError::MalformedModelOutput { raw }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    category: "malformed_model_output",
                    detail: format!("Model returned invalid JSON. Raw output:\n{raw}"),
                    raw_output: Some(raw.clone()),
                },
            ),
            ApiError::Draft(DraftError::Upstream(e)) => {
                (upstream_status(e), body("upstream_service_error", e.to_string()))
            }
            ApiError::Transcribe(TranscribeError::EmptyPayload) => (
                StatusCode::BAD_REQUEST,
                body("transcription_failed", TranscribeError::EmptyPayload.to_string()),
            ),
            ApiError::Transcribe(e @ TranscribeError::Provider(cause)) => {
                (upstream_status(cause), body("transcription_failed", e.to_string()))
            }
            ApiError::Rejected { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => (
                *status,
                body(
                    "payload_too_large",
                    "request body exceeds the configured size limit".into(),
                ),
            ),
            ApiError::Rejected { status, detail } => {
                (*status, body("invalid_request", detail.clone()))
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                body("unauthorized", "Unauthorized".into()),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                body("internal_error", "Internal server error".into()),
            ),
        }
    }
}

fn upstream_status(e: &LlmError) -> StatusCode {
    match e {
        LlmError::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
        LlmError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(message) = &self {
            log::error!("Internal error: {message}");
        }
        let (status, body) = self.parts();
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::ValidationError;

    #[test]
    fn invalid_request_is_400_with_reason() {
        let (status, body) =
            ApiError::from(DraftError::from(ValidationError::MissingSelectedText)).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.category, "invalid_request");
        assert_eq!(body.detail, "mode='edit' requires selected_text");
        assert!(body.raw_output.is_none());
    }

    #[test]
    fn malformed_output_carries_raw_text() {
        let err = ApiError::from(DraftError::MalformedModelOutput {
            raw: "not json".into(),
        });
        let (status, body) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.category, "malformed_model_output");
        assert!(body.detail.ends_with("Raw output:\nnot json"));
        assert_eq!(body.raw_output.as_deref(), Some("not json"));
    }

    #[test]
    fn missing_key_is_service_unavailable() {
        let (status, body) = ApiError::from(DraftError::Upstream(LlmError::MissingApiKey)).parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.category, "upstream_service_error");
        assert_eq!(body.detail, "OPENAI_API_KEY is not set");
    }

    #[test]
    fn provider_status_is_bad_gateway() {
        let err = DraftError::Upstream(LlmError::Status {
            status: 429,
            message: "Rate limit reached".into(),
        });
        let (status, body) = ApiError::from(err).parts();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.detail.contains("Rate limit reached"));
    }

    #[test]
    fn transcription_errors_share_a_category() {
        let (status, body) = ApiError::from(TranscribeError::EmptyPayload).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.category, "transcription_failed");

        let (status, body) =
            ApiError::from(TranscribeError::Provider(LlmError::Timeout)).parts();
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body.category, "transcription_failed");
    }

    #[test]
    fn rejection_keeps_extractor_status() {
        let (status, body) =
            ApiError::rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected `application/json`")
                .parts();
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body.category, "invalid_request");
        assert_eq!(body.detail, "Expected `application/json`");

        let (status, body) =
            ApiError::rejected(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").parts();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body.category, "payload_too_large");
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let (status, body) = ApiError::Internal("db password wrong".into()).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.detail.contains("password"));
    }
}
