use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{LineId, RequestStatus, StoredOrderLine},
    numeric::deserialize_lenient_opt,
};

/// Order line as sent in a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLinePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LineId>,
    pub position_description: String,
    pub unit_price: f64,
    pub amount: f64,
    pub unit: String,
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequestPayload {
    pub requestor_name: String,
    pub title: String,
    pub vendor_name: String,
    pub vendor_vat_id: String,
    pub department: String,
    pub commodity_group: Option<String>,
    pub order_lines: Vec<OrderLinePayload>,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: RequestStatus,
}

/// Server-side list filters. Absent filters are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl RequestFilters {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.department.is_none() && self.search.is_none()
    }
}

/// Structured fields extracted from an uploaded offer. Producer-trusted;
/// every field may be missing. Blank strings read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub requestor_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub vendor_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub vendor_vat_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub order_lines: Vec<StoredOrderLine>,
    #[serde(default, deserialize_with = "deserialize_lenient_opt")]
    pub total_cost: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub commodity_group_suggestion: Option<String>,
}

/// Returns the text when it carries something other than whitespace.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}

fn deserialize_lines<'de, D>(deserializer: D) -> Result<Vec<StoredOrderLine>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<StoredOrderLine>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An offer document picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl OfferUpload {
    pub const PDF_MIME: &'static str = "application/pdf";

    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// The declared type wins; the file extension only decides when no type
    /// was given.
    pub fn is_pdf(&self) -> bool {
        match self.content_type.as_deref() {
            Some(content_type) => content_type.eq_ignore_ascii_case(Self::PDF_MIME),
            None => self.filename.to_ascii_lowercase().ends_with(".pdf"),
        }
    }
}
