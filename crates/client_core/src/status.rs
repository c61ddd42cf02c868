//! Optimistic status changes for one displayed request.
//!
//! A change runs as `begin` (apply locally) followed by exactly one of
//! `confirm` (adopt the server copy) or `revert` (restore the previous
//! status). [`StatusController::set_status`] drives all three against the
//! backend.

use std::sync::Arc;

use shared::{
    domain::{ProcurementRequest, RequestId, RequestStatus},
    error::BackendError,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{backend::ProcurementBackend, error::surface_message};

pub const STATUS_UPDATE_FAILED_FALLBACK: &str = "Could not update status. Please retry.";

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The backend accepted a change; carries its copy of the entity.
    RequestUpdated(ProcurementRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    pub id: RequestId,
    pub previous: RequestStatus,
    pub next: RequestStatus,
}

pub struct StatusController {
    backend: Arc<dyn ProcurementBackend>,
    request: ProcurementRequest,
    pending: Option<PendingTransition>,
    error: Option<String>,
    events: broadcast::Sender<ClientEvent>,
}

impl StatusController {
    pub fn new(
        backend: Arc<dyn ProcurementBackend>,
        request: ProcurementRequest,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        Self {
            backend,
            request,
            pending: None,
            error: None,
            events,
        }
    }

    pub fn request(&self) -> &ProcurementRequest {
        &self.request
    }

    /// Status as currently displayed, including an unconfirmed change.
    pub fn status(&self) -> RequestStatus {
        self.request.status
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the status control should be enabled.
    pub fn can_change_status(&self) -> bool {
        !self.is_pending()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Applies `next` locally. Returns `None` when `next` is already shown
    /// or another change is still in flight.
    pub fn begin(&mut self, next: RequestStatus) -> Option<PendingTransition> {
        if self.pending.is_some() {
            debug!(id = %self.request.id, "status change already in flight");
            return None;
        }
        if next == self.request.status {
            return None;
        }

        let transition = PendingTransition {
            id: self.request.id.clone(),
            previous: self.request.status,
            next,
        };
        self.request.status = next;
        self.error = None;
        self.pending = Some(transition.clone());
        Some(transition)
    }

    /// Adopts the server's copy verbatim and notifies listeners.
    pub fn confirm(&mut self, transition: &PendingTransition, updated: ProcurementRequest) -> bool {
        if self.pending.as_ref() != Some(transition) {
            warn!(id = %transition.id, "ignoring confirmation for a transition that is not pending");
            return false;
        }
        if updated.status != transition.next {
            warn!(
                id = %updated.id,
                requested = %transition.next,
                returned = %updated.status,
                "backend settled on a different status"
            );
        }
        info!(id = %updated.id, status = %updated.status, "request status updated");
        self.pending = None;
        self.request = updated;
        let _ = self
            .events
            .send(ClientEvent::RequestUpdated(self.request.clone()));
        true
    }

    /// Restores the status shown before `transition` and records the error.
    pub fn revert(&mut self, transition: &PendingTransition, err: &BackendError) -> bool {
        if self.pending.as_ref() != Some(transition) {
            return false;
        }
        warn!(
            id = %transition.id,
            status = %transition.previous,
            error = %err,
            "status update failed; rolled back"
        );
        self.pending = None;
        self.request.status = transition.previous;
        self.error = Some(surface_message(err, STATUS_UPDATE_FAILED_FALLBACK));
        true
    }

    /// Runs a full change. `Ok(false)` means nothing was sent.
    pub async fn set_status(&mut self, next: RequestStatus) -> Result<bool, BackendError> {
        let Some(transition) = self.begin(next) else {
            return Ok(false);
        };
        match self
            .backend
            .update_status(&transition.id, transition.next)
            .await
        {
            Ok(updated) => {
                self.confirm(&transition, updated);
                Ok(true)
            }
            Err(err) => {
                self.revert(&transition, &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
