//! Request-intake form lifecycle: editing, offer extraction and submission.
//!
//! Backend round-trips are split into a synchronous `begin_*` step, the
//! backend call, and a synchronous `complete_*` step. The `extract_offer` and
//! `submit` helpers run all three in sequence; callers that keep editing while
//! a call is in flight drive the steps themselves.

use std::sync::Arc;

use shared::{
    domain::{CommodityGroup, LocalLineKey, ProcurementRequest},
    error::BackendError,
    protocol::{CreateRequestPayload, ExtractionResult, OfferUpload},
};
use tracing::{error, info, warn};

use crate::{
    backend::ProcurementBackend,
    draft::{DraftField, LineField, RequestDraft},
    error::{
        surface_message, IntakeError, UploadRejected, ValidationError, MISSING_ORDER_LINES,
        MISSING_REQUIRED_FIELDS,
    },
    reconcile::{reconcile_with_report, ReconcileReport},
    routes::Route,
};

pub const EXTRACTION_RUNNING_MESSAGE: &str = "Parsing offer and extracting data...";
pub const EXTRACTION_SUCCEEDED_MESSAGE: &str =
    "Offer parsed. Fields were pre-filled where possible.";
pub const EXTRACTION_FAILED_FALLBACK: &str = "Failed to parse the offer. Please try again.";
pub const SUBMIT_FAILED_FALLBACK: &str = "Submitting the request failed. Please retry.";
pub const SUBMIT_DEGRADED_MESSAGE: &str = "Request created. Redirecting to all requests...";

/// Required fields in the order they receive focus when invalid.
const REQUIRED_FIELDS: [DraftField; 4] = [
    DraftField::RequestorName,
    DraftField::Department,
    DraftField::Title,
    DraftField::VendorName,
];

pub fn validate(draft: &RequestDraft) -> Result<(), ValidationError> {
    if let Some(field) = REQUIRED_FIELDS
        .into_iter()
        .find(|field| draft.is_blank(*field))
    {
        return Err(ValidationError {
            message: MISSING_REQUIRED_FIELDS,
            focus: Some(field),
        });
    }
    if draft.lines.is_empty() {
        return Err(ValidationError {
            message: MISSING_ORDER_LINES,
            focus: None,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    /// Created; edits stay blocked until the caller has navigated away.
    Succeeded { route: Route, message: String },
    Failed { message: String, focus: Option<DraftField> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionState {
    Idle,
    Running { filename: String },
    Succeeded { message: String },
    Failed { message: String },
}

impl ExtractionState {
    pub fn message(&self) -> Option<&str> {
        match self {
            ExtractionState::Idle => None,
            ExtractionState::Running { .. } => Some(EXTRACTION_RUNNING_MESSAGE),
            ExtractionState::Succeeded { message } | ExtractionState::Failed { message } => {
                Some(message)
            }
        }
    }
}

/// Identifies one extraction. Results carrying a stale ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub route: Route,
    pub message: String,
    /// `None` when the backend's answer could not be read.
    pub created: Option<ProcurementRequest>,
}

pub struct IntakeController {
    backend: Arc<dyn ProcurementBackend>,
    draft: RequestDraft,
    submission: SubmissionState,
    extraction: ExtractionState,
    extraction_generation: u64,
    selected_offer: Option<String>,
}

impl IntakeController {
    pub fn new(backend: Arc<dyn ProcurementBackend>) -> Self {
        Self {
            backend,
            draft: RequestDraft::new(),
            submission: SubmissionState::Idle,
            extraction: ExtractionState::Idle,
            extraction_generation: 0,
            selected_offer: None,
        }
    }

    pub fn draft(&self) -> &RequestDraft {
        &self.draft
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn extraction(&self) -> &ExtractionState {
        &self.extraction
    }

    pub fn selected_offer(&self) -> Option<&str> {
        self.selected_offer.as_deref()
    }

    pub fn total_cost(&self) -> f64 {
        self.draft.total_cost()
    }

    /// True while data is in flight or the post-submit navigation is pending.
    pub fn is_locked(&self) -> bool {
        matches!(
            self.submission,
            SubmissionState::Submitting | SubmissionState::Succeeded { .. }
        )
    }

    pub fn can_upload_offer(&self) -> bool {
        !self.is_locked() && !matches!(self.extraction, ExtractionState::Running { .. })
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) -> bool {
        if self.is_locked() {
            return false;
        }
        self.draft.set_field(field, value);
        true
    }

    pub fn set_commodity_group(&mut self, group: Option<CommodityGroup>) -> bool {
        if self.is_locked() {
            return false;
        }
        self.draft.commodity_group = group;
        true
    }

    pub fn add_line(&mut self) -> Option<LocalLineKey> {
        if self.is_locked() {
            return None;
        }
        Some(self.draft.add_line())
    }

    pub fn remove_line(&mut self, index: usize) -> bool {
        !self.is_locked() && self.draft.remove_line(index).is_some()
    }

    pub fn update_line(&mut self, index: usize, field: LineField, raw: &str) -> bool {
        !self.is_locked() && self.draft.update_line(index, field, raw)
    }

    /// Marks an extraction as running. The upload control stays disabled
    /// until [`complete_extraction`](Self::complete_extraction) is called.
    pub fn begin_extraction(
        &mut self,
        upload: &OfferUpload,
    ) -> Result<ExtractionTicket, UploadRejected> {
        if self.is_locked() {
            return Err(UploadRejected::FormLocked);
        }
        if matches!(self.extraction, ExtractionState::Running { .. }) {
            return Err(UploadRejected::ExtractionRunning);
        }
        if !upload.is_pdf() {
            self.extraction = ExtractionState::Failed {
                message: UploadRejected::NotPdf.to_string(),
            };
            return Err(UploadRejected::NotPdf);
        }

        self.extraction_generation += 1;
        self.selected_offer = Some(upload.filename.clone());
        self.extraction = ExtractionState::Running {
            filename: upload.filename.clone(),
        };
        info!(filename = %upload.filename, bytes = upload.bytes.len(), "offer extraction started");
        Ok(ExtractionTicket(self.extraction_generation))
    }

    /// Applies an extraction outcome to the draft as it is right now.
    /// Returns what the merge changed, or `None` if nothing was merged.
    pub fn complete_extraction(
        &mut self,
        ticket: ExtractionTicket,
        outcome: Result<ExtractionResult, BackendError>,
    ) -> Option<ReconcileReport> {
        if ticket.0 != self.extraction_generation
            || !matches!(self.extraction, ExtractionState::Running { .. })
        {
            warn!(ticket = ticket.0, "dropping stale extraction result");
            return None;
        }

        match outcome {
            Ok(_) if self.is_locked() => {
                warn!("extraction finished after submission started; result not merged");
                self.extraction = ExtractionState::Idle;
                None
            }
            Ok(extraction) => {
                let (merged, report) = reconcile_with_report(&self.draft, &extraction);
                self.draft = merged;
                info!(
                    filled = report.filled.len(),
                    lines_replaced = report.lines_replaced,
                    lines_discarded = report.lines_discarded,
                    "offer extraction merged into draft"
                );
                self.extraction = ExtractionState::Succeeded {
                    message: EXTRACTION_SUCCEEDED_MESSAGE.to_string(),
                };
                Some(report)
            }
            Err(err) => {
                error!(error = %err, "offer extraction failed");
                self.extraction = ExtractionState::Failed {
                    message: surface_message(&err, EXTRACTION_FAILED_FALLBACK),
                };
                None
            }
        }
    }

    pub async fn extract_offer(
        &mut self,
        upload: &OfferUpload,
    ) -> Result<Option<ReconcileReport>, IntakeError> {
        let ticket = self.begin_extraction(upload)?;
        let outcome = self.backend.parse_offer(upload).await;
        let failure = outcome.as_ref().err().cloned();
        let report = self.complete_extraction(ticket, outcome);
        match failure {
            Some(err) => Err(err.into()),
            None => Ok(report),
        }
    }

    /// Validates the draft and moves to `Submitting`, returning the payload
    /// to send. On validation failure the state is `Failed` with the field
    /// to focus.
    pub fn begin_submit(&mut self) -> Result<CreateRequestPayload, IntakeError> {
        if self.is_locked() {
            return Err(IntakeError::Busy);
        }
        self.submission = SubmissionState::Validating;
        if let Err(err) = validate(&self.draft) {
            self.submission = SubmissionState::Failed {
                message: err.message.to_string(),
                focus: err.focus,
            };
            return Err(err.into());
        }
        let payload = self.draft.to_payload();
        self.submission = SubmissionState::Submitting;
        info!(
            lines = payload.order_lines.len(),
            total_cost = payload.total_cost,
            "submitting procurement request"
        );
        Ok(payload)
    }

    pub fn complete_submit(
        &mut self,
        outcome: Result<ProcurementRequest, BackendError>,
    ) -> Result<SubmitOutcome, IntakeError> {
        if self.submission != SubmissionState::Submitting {
            return Err(IntakeError::Busy);
        }

        let result = match outcome {
            Ok(created) => {
                info!(id = %created.id, "procurement request created");
                Ok(SubmitOutcome {
                    route: Route::RequestDetail(created.id.clone()),
                    message: format!("Request created (ID: {}). Redirecting...", created.id),
                    created: Some(created),
                })
            }
            Err(BackendError::UnrecognizedResponse(err)) => {
                warn!(error = %err, "create succeeded without a usable entity");
                let outcome = match err.recovered_id {
                    Some(id) => SubmitOutcome {
                        message: format!("Request created (ID: {id}). Redirecting..."),
                        route: Route::RequestDetail(id),
                        created: None,
                    },
                    None => SubmitOutcome {
                        route: Route::RequestList,
                        message: SUBMIT_DEGRADED_MESSAGE.to_string(),
                        created: None,
                    },
                };
                Ok(outcome)
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(outcome) => {
                self.reset();
                self.submission = SubmissionState::Succeeded {
                    route: outcome.route.clone(),
                    message: outcome.message.clone(),
                };
                Ok(outcome)
            }
            Err(err) => {
                error!(error = %err, "submitting the request failed");
                self.submission = SubmissionState::Failed {
                    message: surface_message(&err, SUBMIT_FAILED_FALLBACK),
                    focus: None,
                };
                Err(err.into())
            }
        }
    }

    pub async fn submit(&mut self) -> Result<SubmitOutcome, IntakeError> {
        let payload = self.begin_submit()?;
        let outcome = self.backend.create_request(&payload).await;
        self.complete_submit(outcome)
    }

    /// Called once the view has moved to the success route. Unlocks the
    /// (already reset) form.
    pub fn finish_navigation(&mut self) -> Option<Route> {
        match std::mem::replace(&mut self.submission, SubmissionState::Idle) {
            SubmissionState::Succeeded { route, .. } => Some(route),
            other => {
                self.submission = other;
                None
            }
        }
    }

    /// Back to an empty form. Any extraction still in flight is orphaned.
    fn reset(&mut self) {
        self.draft = RequestDraft::new();
        self.extraction = ExtractionState::Idle;
        self.extraction_generation += 1;
        self.selected_offer = None;
    }
}

#[cfg(test)]
#[path = "tests/intake_tests.rs"]
mod tests;
