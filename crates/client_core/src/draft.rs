//! In-progress request form state and the order-line model.

use shared::{
    domain::{CommodityGroup, LocalLineKey, OrderLine, StoredOrderLine},
    numeric::{normalize_str, round2},
    protocol::{CreateRequestPayload, OrderLinePayload},
};

/// Form fields that can fail validation, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    RequestorName,
    Department,
    Title,
    VendorName,
    VendorVatId,
}

impl DraftField {
    pub fn label(self) -> &'static str {
        match self {
            DraftField::RequestorName => "Requestor name",
            DraftField::Department => "Department",
            DraftField::Title => "Title",
            DraftField::VendorName => "Vendor name",
            DraftField::VendorVatId => "Vendor VAT ID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Description,
    UnitPrice,
    Quantity,
    Unit,
    LineTotal,
}

/// Creates an empty line keyed by `seed`.
pub fn create_line(seed: u64) -> OrderLine {
    OrderLine::empty(LocalLineKey(seed))
}

/// Applies raw input to one field. Numeric fields go through the normalizer
/// and are floored at zero; changing the price or quantity re-derives the
/// line total.
pub fn update_line(line: &OrderLine, field: LineField, raw: &str) -> OrderLine {
    let mut updated = line.clone();
    match field {
        LineField::Description => updated.description = raw.to_string(),
        LineField::Unit => updated.unit = raw.to_string(),
        LineField::UnitPrice => updated.unit_price = normalize_str(raw).max(0.0),
        LineField::Quantity => updated.quantity = normalize_str(raw).max(0.0),
        LineField::LineTotal => updated.line_total = normalize_str(raw).max(0.0),
    }
    if matches!(field, LineField::UnitPrice | LineField::Quantity) {
        updated.line_total = round2(updated.unit_price * updated.quantity);
    }
    updated
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub requestor_name: String,
    pub title: String,
    pub vendor_name: String,
    pub vendor_vat_id: String,
    pub department: String,
    pub commodity_group: Option<CommodityGroup>,
    pub lines: Vec<OrderLine>,
    next_line_seed: u64,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDraft {
    /// Fresh form: empty fields and a single empty line.
    pub fn new() -> Self {
        Self {
            requestor_name: String::new(),
            title: String::new(),
            vendor_name: String::new(),
            vendor_vat_id: String::new(),
            department: String::new(),
            commodity_group: None,
            lines: vec![create_line(0)],
            next_line_seed: 1,
        }
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::RequestorName => &self.requestor_name,
            DraftField::Department => &self.department,
            DraftField::Title => &self.title,
            DraftField::VendorName => &self.vendor_name,
            DraftField::VendorVatId => &self.vendor_vat_id,
        }
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::RequestorName => self.requestor_name = value,
            DraftField::Department => self.department = value,
            DraftField::Title => self.title = value,
            DraftField::VendorName => self.vendor_name = value,
            DraftField::VendorVatId => self.vendor_vat_id = value,
        }
    }

    pub fn is_blank(&self, field: DraftField) -> bool {
        self.field(field).trim().is_empty()
    }

    /// Hands out the next local key. Keys are never reused within a draft.
    pub fn next_key(&mut self) -> LocalLineKey {
        let key = LocalLineKey(self.next_line_seed);
        self.next_line_seed += 1;
        key
    }

    pub fn add_line(&mut self) -> LocalLineKey {
        let key = self.next_key();
        self.lines.push(OrderLine::empty(key));
        key
    }

    /// Removes the line at `index`. Out-of-range indices are ignored.
    pub fn remove_line(&mut self, index: usize) -> Option<OrderLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn update_line(&mut self, index: usize, field: LineField, raw: &str) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                *line = update_line(line, field, raw);
                true
            }
            None => false,
        }
    }

    /// Replaces the lines with ones reported by the backend, keyed fresh.
    pub fn adopt_lines(&mut self, lines: &[StoredOrderLine]) {
        let adopted = lines
            .iter()
            .map(|line| OrderLine {
                key: self.next_key(),
                id: None,
                description: line.position_description.clone(),
                unit_price: line.unit_price,
                quantity: line.amount,
                unit: line.unit.clone(),
                line_total: line.total_price,
            })
            .collect();
        self.lines = adopted;
    }

    /// True while no line carries user-entered content.
    pub fn lines_untouched(&self) -> bool {
        self.lines.iter().all(OrderLine::is_untouched)
    }

    /// Always derived from the current lines.
    pub fn total_cost(&self) -> f64 {
        round2(self.lines.iter().map(|line| line.line_total).sum())
    }

    /// Trimmed submission payload. Lines only carry an id once persisted.
    pub fn to_payload(&self) -> CreateRequestPayload {
        CreateRequestPayload {
            requestor_name: self.requestor_name.trim().to_string(),
            title: self.title.trim().to_string(),
            vendor_name: self.vendor_name.trim().to_string(),
            vendor_vat_id: self.vendor_vat_id.trim().to_string(),
            department: self.department.trim().to_string(),
            commodity_group: self
                .commodity_group
                .as_ref()
                .map(|group| group.as_str().to_string()),
            order_lines: self
                .lines
                .iter()
                .map(|line| OrderLinePayload {
                    id: line.id,
                    position_description: line.description.trim().to_string(),
                    unit_price: line.unit_price,
                    amount: line.quantity,
                    unit: line.unit.trim().to_string(),
                    total_price: line.line_total,
                })
                .collect(),
            total_cost: self.total_cost(),
        }
    }
}

#[cfg(test)]
#[path = "tests/draft_tests.rs"]
mod tests;
