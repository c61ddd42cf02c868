use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::numeric::deserialize_lenient;

/// Server-assigned request identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a persisted order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub i64);

/// Client-only key for a line inside one draft. Lives in its own key space so
/// it can never be mistaken for a [`LineId`] and is never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LocalLineKey(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Closed")]
    Closed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::Open,
        RequestStatus::InProgress,
        RequestStatus::Closed,
    ];

    /// Value used on the wire and in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Open => "Open",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown request status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Open" => Ok(RequestStatus::Open),
            "In Progress" | "InProgress" => Ok(RequestStatus::InProgress),
            "Closed" => Ok(RequestStatus::Closed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

pub const COMMODITY_GROUPS: &[&str] = &[
    "General Services - Accommodation Rentals",
    "General Services - Membership Fees",
    "General Services - Workplace Safety",
    "General Services - Consulting",
    "General Services - Financial Services",
    "General Services - Fleet Management",
    "General Services - Recruitment Services",
    "General Services - Professional Development",
    "General Services - Miscellaneous Services",
    "General Services - Insurance",
    "Facility Management - Electrical Engineering",
    "Facility Management - Facility Management Services",
    "Facility Management - Security",
    "Facility Management - Renovations",
    "Facility Management - Office Equipment",
    "Facility Management - Energy Management",
    "Facility Management - Maintenance",
    "Facility Management - Cafeteria and Kitchenettes",
    "Facility Management - Cleaning",
    "Publishing Production - Audio and Visual Production",
    "Publishing Production - Books/Videos/CDs",
    "Publishing Production - Printing Costs",
    "Publishing Production - Software Development for Publishing",
    "Publishing Production - Material Costs",
    "Publishing Production - Shipping for Production",
    "Publishing Production - Digital Product Development",
    "Publishing Production - Pre-production",
    "Publishing Production - Post-production Costs",
    "Information Technology - Hardware",
    "Information Technology - IT Services",
    "Information Technology - Software",
    "Logistics - Courier, Express, and Postal Services",
    "Logistics - Warehousing and Material Handling",
    "Logistics - Transportation Logistics",
    "Logistics - Delivery Services",
    "Marketing & Advertising - Advertising",
    "Marketing & Advertising - Outdoor Advertising",
    "Marketing & Advertising - Marketing Agencies",
    "Marketing & Advertising - Direct Mail",
    "Marketing & Advertising - Customer Communication",
    "Marketing & Advertising - Online Marketing",
    "Marketing & Advertising - Events",
    "Marketing & Advertising - Promotional Materials",
    "Production - Warehouse and Operational Equipment",
    "Production - Production Machinery",
    "Production - Spare Parts",
    "Production - Internal Transportation",
    "Production - Production Materials",
    "Production - Consumables",
    "Production - Maintenance and Repairs",
    "Other",
];

/// A member of [`COMMODITY_GROUPS`]. Only constructible through
/// [`CommodityGroup::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommodityGroup(&'static str);

impl CommodityGroup {
    pub fn parse(value: &str) -> Option<Self> {
        COMMODITY_GROUPS
            .iter()
            .find(|group| **group == value)
            .map(|group| CommodityGroup(*group))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for CommodityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One purchasable item as held by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub key: LocalLineKey,
    pub id: Option<LineId>,
    pub description: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub unit: String,
    pub line_total: f64,
}

impl OrderLine {
    pub fn empty(key: LocalLineKey) -> Self {
        Self {
            key,
            id: None,
            description: String::new(),
            unit_price: 0.0,
            quantity: 0.0,
            unit: String::new(),
            line_total: 0.0,
        }
    }

    /// True while nothing has been typed into the line.
    pub fn is_untouched(&self) -> bool {
        self.description.trim().is_empty()
            && self.quantity == 0.0
            && self.unit_price == 0.0
            && self.line_total == 0.0
    }
}

/// Order line as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOrderLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LineId>,
    #[serde(default)]
    pub position_description: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub total_price: f64,
}

/// Persisted procurement request. The backend copy is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementRequest {
    pub id: RequestId,
    #[serde(default)]
    pub requestor_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub vendor_vat_id: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub order_lines: Vec<StoredOrderLine>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub total_cost: f64,
    #[serde(default)]
    pub commodity_group: Option<String>,
    pub status: RequestStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps and naive ISO-8601 ones, the latter read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}
