use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{ProcurementRequest, RequestId, RequestStatus},
    error::{ApiError, BackendError, UnrecognizedResponseError},
    protocol::{
        CreateRequestPayload, ExtractionResult, OfferUpload, RequestFilters, StatusUpdateRequest,
    },
};
use tracing::{debug, warn};
use url::Url;

/// Everything the client needs from the procurement backend.
#[async_trait]
pub trait ProcurementBackend: Send + Sync {
    async fn create_request(
        &self,
        payload: &CreateRequestPayload,
    ) -> Result<ProcurementRequest, BackendError>;
    async fn list_requests(
        &self,
        filters: &RequestFilters,
    ) -> Result<Vec<ProcurementRequest>, BackendError>;
    async fn get_request(&self, id: &RequestId) -> Result<ProcurementRequest, BackendError>;
    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<ProcurementRequest, BackendError>;
    async fn parse_offer(&self, upload: &OfferUpload) -> Result<ExtractionResult, BackendError>;
}

/// Stand-in used when no backend is configured.
pub struct MissingBackend;

fn backend_unavailable() -> BackendError {
    ApiError::transport("procurement backend is unavailable").into()
}

#[async_trait]
impl ProcurementBackend for MissingBackend {
    async fn create_request(
        &self,
        _payload: &CreateRequestPayload,
    ) -> Result<ProcurementRequest, BackendError> {
        Err(backend_unavailable())
    }

    async fn list_requests(
        &self,
        _filters: &RequestFilters,
    ) -> Result<Vec<ProcurementRequest>, BackendError> {
        Err(backend_unavailable())
    }

    async fn get_request(&self, _id: &RequestId) -> Result<ProcurementRequest, BackendError> {
        Err(backend_unavailable())
    }

    async fn update_status(
        &self,
        _id: &RequestId,
        _status: RequestStatus,
    ) -> Result<ProcurementRequest, BackendError> {
        Err(backend_unavailable())
    }

    async fn parse_offer(&self, _upload: &OfferUpload) -> Result<ExtractionResult, BackendError> {
        Err(backend_unavailable())
    }
}

/// JSON-over-HTTP backend.
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::transport(format!("base url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = builder.send().await.map_err(|err| {
            warn!(operation, error = %err, "backend request failed before a response");
            ApiError::transport(err.to_string())
        })?;
        decode_response(operation, response).await
    }
}

async fn decode_response<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| ApiError::transport(err.to_string()))?;
    let body = serde_json::from_slice::<Value>(&bytes).ok();

    if !status.is_success() {
        let err = ApiError::from_response_body(status.as_u16(), body);
        debug!(
            operation,
            status = err.status,
            code = ?err.code(),
            message = %err.message,
            "backend rejected request"
        );
        return Err(err.into());
    }

    let body = body.ok_or_else(|| UnrecognizedResponseError {
        operation,
        reason: "response body is not JSON".to_string(),
        recovered_id: None,
    })?;
    let recovered_id = recover_id(&body);
    serde_json::from_value(body).map_err(|err| {
        warn!(operation, error = %err, "backend response has an unexpected shape");
        UnrecognizedResponseError {
            operation,
            reason: err.to_string(),
            recovered_id,
        }
        .into()
    })
}

fn recover_id(body: &Value) -> Option<RequestId> {
    body.get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| RequestId(id.to_string()))
}

#[async_trait]
impl ProcurementBackend for HttpBackend {
    async fn create_request(
        &self,
        payload: &CreateRequestPayload,
    ) -> Result<ProcurementRequest, BackendError> {
        let url = self.endpoint(&["requests"])?;
        let builder = self.request(Method::POST, url).json(payload);
        self.send("create_request", builder).await
    }

    async fn list_requests(
        &self,
        filters: &RequestFilters,
    ) -> Result<Vec<ProcurementRequest>, BackendError> {
        let url = self.endpoint(&["requests"])?;
        let builder = self.request(Method::GET, url).query(filters);
        self.send("list_requests", builder).await
    }

    async fn get_request(&self, id: &RequestId) -> Result<ProcurementRequest, BackendError> {
        let url = self.endpoint(&["requests", id.as_str()])?;
        self.send("get_request", self.request(Method::GET, url)).await
    }

    async fn update_status(
        &self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<ProcurementRequest, BackendError> {
        let url = self.endpoint(&["requests", id.as_str(), "status"])?;
        let builder = self
            .request(Method::PATCH, url)
            .json(&StatusUpdateRequest { status });
        self.send("update_status", builder).await
    }

    async fn parse_offer(&self, upload: &OfferUpload) -> Result<ExtractionResult, BackendError> {
        let url = self.endpoint(&["offers", "parse"])?;
        let mut part =
            multipart::Part::bytes(upload.bytes.clone()).file_name(upload.filename.clone());
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|err| ApiError::transport(err.to_string()))?;
        }
        let form = multipart::Form::new().part("file", part);
        let builder = self.request(Method::POST, url).multipart(form);
        self.send("parse_offer", builder).await
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
