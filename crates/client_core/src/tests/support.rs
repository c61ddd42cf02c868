use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shared::{
    domain::{ProcurementRequest, RequestId, RequestStatus, StoredOrderLine},
    error::{ApiError, BackendError},
    protocol::{CreateRequestPayload, ExtractionResult, OfferUpload, RequestFilters},
};

use crate::backend::ProcurementBackend;

pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0)
        .single()
        .unwrap_or_default()
}

pub(crate) fn stored_request(
    id: &str,
    title: &str,
    total_cost: f64,
    status: RequestStatus,
    minutes_after_base: i64,
) -> ProcurementRequest {
    let created_at = base_time() + Duration::minutes(minutes_after_base);
    ProcurementRequest {
        id: RequestId(id.to_string()),
        requestor_name: "Jane".into(),
        title: title.into(),
        vendor_name: "Acme".into(),
        vendor_vat_id: String::new(),
        department: "IT".into(),
        order_lines: vec![StoredOrderLine {
            id: None,
            position_description: title.into(),
            unit_price: total_cost,
            amount: 1.0,
            unit: "pcs".into(),
            total_price: total_cost,
        }],
        total_cost,
        commodity_group: None,
        status,
        created_at,
        updated_at: created_at,
    }
}

fn not_found() -> BackendError {
    ApiError::new(404, "Request not found").into()
}

/// In-memory backend with switchable failures and call recording.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub requests: Mutex<Vec<ProcurementRequest>>,
    pub fail_with: Mutex<Option<BackendError>>,
    pub extraction: Mutex<Option<Result<ExtractionResult, BackendError>>>,
    pub created: Mutex<Vec<CreateRequestPayload>>,
    pub list_calls: Mutex<Vec<RequestFilters>>,
    pub status_calls: Mutex<Vec<(RequestId, RequestStatus)>>,
    pub parse_calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_requests(requests: Vec<ProcurementRequest>) -> Self {
        let backend = Self::default();
        *backend.requests.lock().unwrap() = requests;
        backend
    }

    pub fn fail_next(&self, err: impl Into<BackendError>) {
        *self.fail_with.lock().unwrap() = Some(err.into());
    }

    pub fn set_extraction(&self, outcome: Result<ExtractionResult, BackendError>) {
        *self.extraction.lock().unwrap() = Some(outcome);
    }

    fn take_failure(&self) -> Result<(), BackendError> {
        match self.fail_with.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProcurementBackend for FakeBackend {
    async fn create_request(
        &self,
        payload: &CreateRequestPayload,
    ) -> Result<ProcurementRequest, BackendError> {
        self.created.lock().unwrap().push(payload.clone());
        self.take_failure()?;

        let mut requests = self.requests.lock().unwrap();
        let created_at = base_time() + Duration::minutes(requests.len() as i64);
        let created = ProcurementRequest {
            id: RequestId(format!("req-{}", requests.len() + 1)),
            requestor_name: payload.requestor_name.clone(),
            title: payload.title.clone(),
            vendor_name: payload.vendor_name.clone(),
            vendor_vat_id: payload.vendor_vat_id.clone(),
            department: payload.department.clone(),
            order_lines: payload
                .order_lines
                .iter()
                .map(|line| StoredOrderLine {
                    id: None,
                    position_description: line.position_description.clone(),
                    unit_price: line.unit_price,
                    amount: line.amount,
                    unit: line.unit.clone(),
                    total_price: line.total_price,
                })
                .collect(),
            total_cost: payload.total_cost,
            commodity_group: payload.commodity_group.clone(),
            status: RequestStatus::Open,
            created_at,
            updated_at: created_at,
        };
        requests.push(created.clone());
        Ok(created)
    }

    async fn list_requests(
        &self,
        filters: &RequestFilters,
    ) -> Result<Vec<ProcurementRequest>, BackendError> {
        self.list_calls.lock().unwrap().push(filters.clone());
        self.take_failure()?;
        Ok(self.requests.lock().unwrap().clone())
    }

    async fn get_request(&self, id: &RequestId) -> Result<ProcurementRequest, BackendError> {
        self.take_failure()?;
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|request| &request.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<ProcurementRequest, BackendError> {
        self.status_calls.lock().unwrap().push((id.clone(), status));
        self.take_failure()?;

        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .iter_mut()
            .find(|request| &request.id == id)
            .ok_or_else(not_found)?;
        request.status = status;
        request.updated_at = request.updated_at + Duration::minutes(5);
        Ok(request.clone())
    }

    async fn parse_offer(&self, upload: &OfferUpload) -> Result<ExtractionResult, BackendError> {
        self.parse_calls.lock().unwrap().push(upload.filename.clone());
        self.take_failure()?;
        self.extraction
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(ExtractionResult::default()))
    }
}
