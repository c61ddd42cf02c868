//! Fetch-backed state for the list and detail screens.

use std::sync::Arc;

use shared::{
    domain::{ProcurementRequest, RequestId},
    protocol::RequestFilters,
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    backend::ProcurementBackend,
    error::surface_message,
    list_query::{ListQueryState, SortColumn, SortState},
    status::{ClientEvent, StatusController},
};

pub const LIST_LOAD_FAILED_FALLBACK: &str = "Could not load requests.";
pub const DETAIL_LOAD_FAILED_FALLBACK: &str = "Could not load the request.";
pub const EMPTY_LIST_MESSAGE: &str = "No requests yet";

pub enum DetailState {
    Loading,
    Loaded(Box<StatusController>),
    NotFound,
    Failed { message: String },
}

pub struct DetailView {
    backend: Arc<dyn ProcurementBackend>,
    events: broadcast::Sender<ClientEvent>,
    id: RequestId,
    state: DetailState,
}

impl DetailView {
    pub fn new(
        backend: Arc<dyn ProcurementBackend>,
        events: broadcast::Sender<ClientEvent>,
        id: RequestId,
    ) -> Self {
        Self {
            backend,
            events,
            id,
            state: DetailState::Loading,
        }
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn request(&self) -> Option<&ProcurementRequest> {
        match &self.state {
            DetailState::Loaded(status) => Some(status.request()),
            _ => None,
        }
    }

    /// Status controller of the loaded request.
    pub fn status_mut(&mut self) -> Option<&mut StatusController> {
        match &mut self.state {
            DetailState::Loaded(status) => Some(status.as_mut()),
            _ => None,
        }
    }

    pub async fn load(&mut self) {
        self.state = DetailState::Loading;
        self.state = match self.backend.get_request(&self.id).await {
            Ok(request) => DetailState::Loaded(Box::new(StatusController::new(
                self.backend.clone(),
                request,
                self.events.clone(),
            ))),
            Err(err) if err.is_not_found() => {
                info!(id = %self.id, "request not found");
                DetailState::NotFound
            }
            Err(err) => {
                warn!(id = %self.id, error = %err, "loading request failed");
                DetailState::Failed {
                    message: surface_message(&err, DETAIL_LOAD_FAILED_FALLBACK),
                }
            }
        };
    }
}

/// Full result set plus the query state that selects the visible rows.
pub struct ListView {
    backend: Arc<dyn ProcurementBackend>,
    query: ListQueryState,
    requests: Vec<ProcurementRequest>,
    error: Option<String>,
}

impl ListView {
    pub fn new(backend: Arc<dyn ProcurementBackend>, query: ListQueryState) -> Self {
        Self {
            backend,
            query,
            requests: Vec::new(),
            error: None,
        }
    }

    pub fn query(&self) -> &ListQueryState {
        &self.query
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn requests(&self) -> &[ProcurementRequest] {
        &self.requests
    }

    /// Fetches every request. Filtering happens locally in [`Self::rows`].
    pub async fn load(&mut self) {
        match self.backend.list_requests(&RequestFilters::default()).await {
            Ok(requests) => {
                info!(count = requests.len(), "requests loaded");
                self.requests = requests;
                self.error = None;
            }
            Err(err) => {
                warn!(error = %err, "loading requests failed");
                self.requests.clear();
                self.error = Some(surface_message(&err, LIST_LOAD_FAILED_FALLBACK));
            }
        }
    }

    pub fn rows(&self) -> Vec<&ProcurementRequest> {
        self.query.derive(&self.requests)
    }

    pub fn summary(&self) -> String {
        format!("{} results", self.rows().len())
    }

    /// Shown in place of the table when no row survives the filters.
    pub fn empty_message(&self) -> Option<&'static str> {
        (self.error.is_none() && self.rows().is_empty()).then_some(EMPTY_LIST_MESSAGE)
    }

    /// Applies filters and returns the query string to put in the URL.
    pub fn apply_filters(&mut self, filters: RequestFilters) -> String {
        self.query.apply_filters(filters);
        self.query.to_query_string()
    }

    pub fn reset_filters(&mut self) -> String {
        self.query.reset_filters();
        self.query.to_query_string()
    }

    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.query.toggle_sort(column);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.query.set_sort(sort);
    }

    /// Replaces the local copy of an updated request. Unknown ids are ignored.
    pub fn apply_update(&mut self, updated: &ProcurementRequest) -> bool {
        match self
            .requests
            .iter_mut()
            .find(|request| request.id == updated.id)
        {
            Some(request) => {
                *request = updated.clone();
                true
            }
            None => false,
        }
    }

    pub fn apply_event(&mut self, event: &ClientEvent) -> bool {
        match event {
            ClientEvent::RequestUpdated(updated) => self.apply_update(updated),
        }
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
