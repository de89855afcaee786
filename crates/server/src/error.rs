use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use uuid::Uuid;
use vecgate_common::{FieldIssue, VecgateError};

/// Correlation ID attached to every response and log line of a request
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody<'a> {
    pub message: String,
    pub code: &'static str,
    pub request_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<&'a [FieldIssue]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A failed request, rendered at the HTTP boundary
#[derive(Debug, thiserror::Error)]
#[error("{source} (request {request_id})")]
pub struct ApiError {
    request_id: String,
    source: VecgateError,
    failure_message: Option<&'static str>,
}

impl ApiError {
    pub fn new(request_id: impl Into<String>, source: VecgateError) -> Self {
        Self {
            request_id: request_id.into(),
            source,
            failure_message: None,
        }
    }

    /// Message used instead of the generic one when a backend call failed
    pub fn with_failure_message(mut self, message: &'static str) -> Self {
        self.failure_message = Some(message);
        self
    }

    pub fn kind(&self) -> &VecgateError {
        &self.source
    }

    fn body(&self) -> ErrorBody<'_> {
        let backend_failure = matches!(
            self.source,
            VecgateError::Backend(_) | VecgateError::Upstream { .. }
        );

        let message = match self.failure_message {
            Some(message) if backend_failure => message.to_string(),
            _ => self.source.public_message(),
        };

        let error = match &self.source {
            VecgateError::Backend(detail) => Some(detail.clone()),
            VecgateError::Upstream { details, .. } => Some(details.clone()),
            _ => None,
        };

        ErrorBody {
            message,
            code: self.source.code(),
            request_id: &self.request_id,
            issues: self.source.issues(),
            hint: self.source.hint(),
            error,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.source.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
