use shared::error::BackendError;
use thiserror::Error;

use crate::draft::DraftField;

pub const MISSING_REQUIRED_FIELDS: &str = "Please fill in all required fields.";
pub const MISSING_ORDER_LINES: &str = "Please add at least one order line.";

/// Local, pre-submission failure. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: &'static str,
    /// First invalid field in focus order, if a field is at fault.
    pub focus: Option<DraftField>,
}

/// Reasons an offer upload is refused before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadRejected {
    #[error("Only PDF files are supported.")]
    NotPdf,
    #[error("An offer is already being parsed.")]
    ExtractionRunning,
    #[error("The form is being submitted.")]
    FormLocked,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(#[from] UploadRejected),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("another operation is still in flight")]
    Busy,
}

/// Message to show for a backend failure. Transport failures and unusable
/// payloads carry nothing a user can act on, so they get `fallback`.
pub fn surface_message(err: &BackendError, fallback: &str) -> String {
    match err {
        BackendError::Api(api) if api.status != 0 => api.message.clone(),
        _ => fallback.to_string(),
    }
}
