//! Filter and sort state of the request list, and the pure derivation of the
//! visible rows from it.

use std::{cmp::Ordering, fmt, str::FromStr};

use shared::{
    domain::{ProcurementRequest, RequestStatus},
    protocol::{present, RequestFilters},
};
use thiserror::Error;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Id,
    Title,
    VendorName,
    Department,
    TotalCost,
    Status,
    CreatedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 7] = [
        SortColumn::Id,
        SortColumn::Title,
        SortColumn::VendorName,
        SortColumn::Department,
        SortColumn::TotalCost,
        SortColumn::Status,
        SortColumn::CreatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::VendorName => "vendor_name",
            SortColumn::Department => "department",
            SortColumn::TotalCost => "total_cost",
            SortColumn::Status => "status",
            SortColumn::CreatedAt => "created_at",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Id => "ID",
            SortColumn::Title => "Title",
            SortColumn::VendorName => "Vendor",
            SortColumn::Department => "Department",
            SortColumn::TotalCost => "Total",
            SortColumn::Status => "Status",
            SortColumn::CreatedAt => "Created",
        }
    }

    /// Direction used when the column is first selected.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortColumn::CreatedAt => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    fn compare(self, a: &ProcurementRequest, b: &ProcurementRequest) -> Ordering {
        match self {
            SortColumn::TotalCost => a.total_cost.total_cmp(&b.total_cost),
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            SortColumn::Id => compare_text(a.id.as_str(), b.id.as_str()),
            SortColumn::Title => compare_text(&a.title, &b.title),
            SortColumn::VendorName => compare_text(&a.vendor_name, &b.vendor_name),
            SortColumn::Department => compare_text(&a.department, &b.department),
            SortColumn::Status => compare_text(a.status.as_str(), b.status.as_str()),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort column '{0}'")]
pub struct UnknownSortColumn(pub String);

impl FromStr for SortColumn {
    type Err = UnknownSortColumn;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        SortColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == normalized)
            .ok_or_else(|| UnknownSortColumn(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::CreatedAt,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    /// Sorts by `column` in its default direction, or the opposite one when
    /// `reversed`.
    pub fn by(column: SortColumn, reversed: bool) -> Self {
        let direction = column.default_direction();
        Self {
            column,
            direction: if reversed { direction.flipped() } else { direction },
        }
    }

    /// Same column flips the direction; a new column starts at its default.
    pub fn toggled(self, column: SortColumn) -> Self {
        if column == self.column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: column.default_direction(),
            }
        }
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn matches_filters(request: &ProcurementRequest, filters: &RequestFilters) -> bool {
    if filters
        .status
        .is_some_and(|status| status != request.status)
    {
        return false;
    }
    if let Some(department) = present(filters.department.as_deref()) {
        if !contains_ignore_case(&request.department, department.trim()) {
            return false;
        }
    }
    if let Some(search) = present(filters.search.as_deref()) {
        let search = search.trim();
        if !contains_ignore_case(&request.title, search)
            && !contains_ignore_case(&request.vendor_name, search)
        {
            return false;
        }
    }
    true
}

/// Visible rows for the given state. Pure; equal keys keep their input order.
pub fn derive<'a>(
    requests: &'a [ProcurementRequest],
    filters: &RequestFilters,
    sort: SortState,
) -> Vec<&'a ProcurementRequest> {
    let mut rows: Vec<&ProcurementRequest> = requests
        .iter()
        .filter(|request| matches_filters(request, filters))
        .collect();
    rows.sort_by(|a, b| sort.direction.apply(sort.column.compare(a, b)));
    rows
}

/// Reads a status filter as typed into a form or URL. Blank, `all` and
/// unknown values mean "no status filter".
pub fn parse_status_filter(raw: &str) -> Option<RequestStatus> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("all") {
        return None;
    }
    raw.parse().ok()
}

fn normalize_text_filter(value: Option<String>) -> Option<String> {
    present(value.as_deref()).map(|value| value.trim().to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQueryState {
    filters: RequestFilters,
    sort: SortState,
}

impl ListQueryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the filters from a query string such as `?status=Open&search=mac`.
    /// Unrecognized parameters are ignored.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut filters = RequestFilters::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "status" => filters.status = parse_status_filter(&value),
                "search" => filters.search = Some(value.into_owned()),
                "department" => filters.department = Some(value.into_owned()),
                _ => {}
            }
        }
        let mut state = Self::default();
        state.apply_filters(filters);
        state
    }

    pub fn filters(&self) -> &RequestFilters {
        &self.filters
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Replaces the filters. Text filters are trimmed and dropped when empty.
    pub fn apply_filters(&mut self, filters: RequestFilters) {
        self.filters = RequestFilters {
            status: filters.status,
            department: normalize_text_filter(filters.department),
            search: normalize_text_filter(filters.search),
        };
    }

    pub fn reset_filters(&mut self) {
        self.filters = RequestFilters::default();
    }

    pub fn toggle_sort(&mut self, column: SortColumn) {
        self.sort = self.sort.toggled(column);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn derive<'a>(&self, requests: &'a [ProcurementRequest]) -> Vec<&'a ProcurementRequest> {
        derive(requests, &self.filters, self.sort)
    }

    /// Query string for the current filters, without the leading `?`.
    /// Filters at their default are omitted.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(status) = self.filters.status {
            serializer.append_pair("status", status.as_str());
        }
        if let Some(search) = self.filters.search.as_deref() {
            serializer.append_pair("search", search);
        }
        if let Some(department) = self.filters.department.as_deref() {
            serializer.append_pair("department", department);
        }
        serializer.finish()
    }
}

#[cfg(test)]
#[path = "tests/list_query_tests.rs"]
mod tests;
