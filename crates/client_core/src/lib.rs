pub mod backend;
pub mod draft;
pub mod error;
pub mod format;
pub mod intake;
pub mod list_query;
pub mod reconcile;
pub mod routes;
pub mod status;
pub mod views;

pub use backend::{HttpBackend, MissingBackend, ProcurementBackend};
pub use draft::{DraftField, LineField, RequestDraft};
pub use error::{IntakeError, UploadRejected, ValidationError};
pub use intake::{ExtractionState, IntakeController, SubmissionState, SubmitOutcome};
pub use list_query::{ListQueryState, SortColumn, SortDirection, SortState};
pub use reconcile::{reconcile, ReconcileReport};
pub use routes::Route;
pub use status::{ClientEvent, StatusController};
pub use views::{DetailState, DetailView, ListView};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
