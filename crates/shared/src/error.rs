use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::RequestId;

/// Fallback message when the backend gives no usable reason.
pub const GENERIC_BACKEND_FAILURE: &str = "Request to backend failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    NotFound,
    Validation,
    Rejected,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => ErrorCode::Transport,
            404 => ErrorCode::NotFound,
            400 | 422 => ErrorCode::Validation,
            500..=599 => ErrorCode::Internal,
            _ => ErrorCode::Rejected,
        }
    }
}

/// Backend rejection or transport failure. `status` is the HTTP status, or
/// `0` when no response arrived at all.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (status {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    /// Builds an error from a non-success response body. The message comes
    /// from a string `detail`, then a string `message`, then the generic
    /// fallback.
    pub fn from_response_body(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|body| {
                body.get("detail")
                    .and_then(Value::as_str)
                    .filter(|text| !text.is_empty())
                    .or_else(|| {
                        body.get("message")
                            .and_then(Value::as_str)
                            .filter(|text| !text.is_empty())
                    })
            })
            .unwrap_or(GENERIC_BACKEND_FAILURE)
            .to_string();
        Self {
            status,
            message,
            details: body,
        }
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::from_status(self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// The backend reported success but the payload cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unrecognized {operation} response: {reason}")]
pub struct UnrecognizedResponseError {
    pub operation: &'static str,
    pub reason: String,
    /// The `id` the body carried, when the rest of it could not be decoded.
    pub recovered_id: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    UnrecognizedResponse(#[from] UnrecognizedResponseError),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Api(err) if err.is_not_found())
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> &str {
        match self {
            BackendError::Api(err) => &err.message,
            BackendError::UnrecognizedResponse(_) => GENERIC_BACKEND_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn message_prefers_detail_then_message() {
        let err = ApiError::from_response_body(404, Some(json!({"detail": "Request not found"})));
        assert_eq!(err.message, "Request not found");
        assert!(err.is_not_found());

        let err = ApiError::from_response_body(500, Some(json!({"message": "boom"})));
        assert_eq!(err.message, "boom");
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[test]
    fn structured_detail_falls_back_to_generic_message() {
        let err = ApiError::from_response_body(
            422,
            Some(json!({"detail": [{"loc": ["body", "title"], "msg": "field required"}]})),
        );
        assert_eq!(err.message, GENERIC_BACKEND_FAILURE);
        assert_eq!(err.code(), ErrorCode::Validation);
        assert!(err.details.is_some());

        let err = ApiError::from_response_body(502, None);
        assert_eq!(err.message, GENERIC_BACKEND_FAILURE);
    }

    #[test]
    fn transport_failures_have_status_zero() {
        let err = BackendError::from(ApiError::transport("connection refused"));
        assert!(!err.is_not_found());
        assert_eq!(err.user_message(), "connection refused");
    }
}
