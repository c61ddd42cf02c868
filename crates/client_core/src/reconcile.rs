//! Merge of extraction output into a draft.
//!
//! The draft is the high-priority writer and the extraction the low-priority
//! one: extraction may only populate what the user has not touched. The merge
//! is a pure function over two snapshots so it always runs against whatever
//! the draft looks like when the extraction response lands.

use shared::{
    domain::CommodityGroup,
    protocol::{present, ExtractionResult},
};

use crate::draft::{DraftField, RequestDraft};

/// Placeholder for required fields the offer did not mention.
pub const UNKNOWN_FALLBACK: &str = "Unknown";

/// What a reconciliation changed, for status reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub filled: Vec<DraftField>,
    pub commodity_group_set: bool,
    pub lines_replaced: bool,
    pub lines_discarded: bool,
}

pub fn reconcile(draft: &RequestDraft, extraction: &ExtractionResult) -> RequestDraft {
    reconcile_with_report(draft, extraction).0
}

pub fn reconcile_with_report(
    draft: &RequestDraft,
    extraction: &ExtractionResult,
) -> (RequestDraft, ReconcileReport) {
    let mut merged = draft.clone();
    let mut report = ReconcileReport::default();

    for (field, value) in [
        (DraftField::VendorName, &extraction.vendor_name),
        (DraftField::Title, &extraction.title),
        (DraftField::VendorVatId, &extraction.vendor_vat_id),
    ] {
        if let Some(value) = present(value.as_deref()) {
            if merged.is_blank(field) {
                merged.set_field(field, value.trim());
                report.filled.push(field);
            }
        }
    }

    for (field, value) in [
        (DraftField::RequestorName, &extraction.requestor_name),
        (DraftField::Department, &extraction.department),
    ] {
        if merged.is_blank(field) {
            let value = present(value.as_deref())
                .map(str::trim)
                .unwrap_or(UNKNOWN_FALLBACK);
            merged.set_field(field, value);
            report.filled.push(field);
        }
    }

    if merged.commodity_group.is_none() {
        if let Some(group) = present(extraction.commodity_group_suggestion.as_deref())
            .and_then(|suggestion| CommodityGroup::parse(suggestion.trim()))
        {
            merged.commodity_group = Some(group);
            report.commodity_group_set = true;
        }
    }

    if !extraction.order_lines.is_empty() {
        if merged.lines_untouched() {
            merged.adopt_lines(&extraction.order_lines);
            report.lines_replaced = true;
        } else {
            report.lines_discarded = true;
        }
    }

    (merged, report)
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
