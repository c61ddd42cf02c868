use shared::domain::RequestId;

use super::*;
use crate::test_support::stored_request;

fn ids(rows: &[&ProcurementRequest]) -> Vec<String> {
    rows.iter().map(|row| row.id.to_string()).collect()
}

fn by_total() -> Vec<ProcurementRequest> {
    vec![
        stored_request("a", "Desk", 300.0, RequestStatus::Open, 0),
        stored_request("b", "Chair", 100.0, RequestStatus::Open, 1),
        stored_request("c", "Lamp", 200.0, RequestStatus::Open, 2),
    ]
}

#[test]
fn total_cost_sorts_numerically_and_toggles() {
    let requests = by_total();
    let mut state = ListQueryState::new();

    state.toggle_sort(SortColumn::TotalCost);
    let totals: Vec<f64> = state.derive(&requests).iter().map(|r| r.total_cost).collect();
    assert_eq!(totals, vec![100.0, 200.0, 300.0]);

    state.toggle_sort(SortColumn::TotalCost);
    let totals: Vec<f64> = state.derive(&requests).iter().map(|r| r.total_cost).collect();
    assert_eq!(totals, vec![300.0, 200.0, 100.0]);
}

#[test]
fn default_sort_is_newest_first() {
    let requests = by_total();
    let state = ListQueryState::new();
    assert_eq!(ids(&state.derive(&requests)), vec!["c", "b", "a"]);
}

#[test]
fn explicit_sort_keeps_the_current_column_default() {
    let requests = by_total();
    let mut state = ListQueryState::new();

    state.set_sort(SortState::by(SortColumn::CreatedAt, false));
    assert_eq!(state.sort(), SortState::default());
    assert_eq!(ids(&state.derive(&requests)), vec!["c", "b", "a"]);

    state.set_sort(SortState::by(SortColumn::CreatedAt, true));
    assert_eq!(ids(&state.derive(&requests)), vec!["a", "b", "c"]);

    state.set_sort(SortState::by(SortColumn::TotalCost, true));
    assert_eq!(ids(&state.derive(&requests)), vec!["a", "c", "b"]);
}

#[test]
fn new_column_starts_at_its_default_direction() {
    let sort = SortState::default().toggled(SortColumn::Title);
    assert_eq!(sort.direction, SortDirection::Ascending);

    let sort = sort.toggled(SortColumn::CreatedAt);
    assert_eq!(sort.direction, SortDirection::Descending);
    assert_eq!(
        sort.toggled(SortColumn::CreatedAt).direction,
        SortDirection::Ascending
    );
}

#[test]
fn text_columns_ignore_case() {
    let mut requests = by_total();
    requests[0].vendor_name = "zeta".into();
    requests[1].vendor_name = "Alpha".into();
    requests[2].vendor_name = "beta".into();

    let rows = derive(
        &requests,
        &RequestFilters::default(),
        SortState {
            column: SortColumn::VendorName,
            direction: SortDirection::Ascending,
        },
    );
    assert_eq!(ids(&rows), vec!["b", "c", "a"]);
}

#[test]
fn equal_keys_keep_input_order_in_both_directions() {
    let requests = vec![
        stored_request("first", "Same", 50.0, RequestStatus::Open, 0),
        stored_request("second", "Same", 50.0, RequestStatus::Open, 1),
        stored_request("third", "Other", 10.0, RequestStatus::Open, 2),
    ];
    let ascending = SortState {
        column: SortColumn::TotalCost,
        direction: SortDirection::Ascending,
    };

    let rows = derive(&requests, &RequestFilters::default(), ascending);
    assert_eq!(ids(&rows), vec!["third", "first", "second"]);

    let rows = derive(
        &requests,
        &RequestFilters::default(),
        ascending.toggled(SortColumn::TotalCost),
    );
    assert_eq!(ids(&rows), vec!["first", "second", "third"]);
}

#[test]
fn status_filter_keeps_only_matching_rows() {
    let requests = vec![
        stored_request("open", "A", 1.0, RequestStatus::Open, 0),
        stored_request("closed", "B", 1.0, RequestStatus::Closed, 1),
    ];
    let filters = RequestFilters {
        status: Some(RequestStatus::Open),
        ..RequestFilters::default()
    };

    let rows = derive(&requests, &filters, SortState::default());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, RequestId("open".into()));
}

#[test]
fn filters_are_and_combined() {
    let mut requests = vec![
        stored_request("1", "MacBook Pro", 1.0, RequestStatus::Open, 0),
        stored_request("2", "Office chairs", 1.0, RequestStatus::Open, 1),
        stored_request("3", "Monitor", 1.0, RequestStatus::InProgress, 2),
    ];
    requests[1].vendor_name = "Mac Office Supplies".into();
    requests[1].department = "Facilities".into();

    let filters = RequestFilters {
        status: Some(RequestStatus::Open),
        department: Some("it".into()),
        search: Some("MAC".into()),
    };
    let rows = derive(&requests, &filters, SortState::default());
    assert_eq!(ids(&rows), vec!["1"]);

    let filters = RequestFilters {
        search: Some("mac".into()),
        ..RequestFilters::default()
    };
    let rows = derive(&requests, &filters, SortState::default());
    assert_eq!(ids(&rows), vec!["2", "1"]);
}

#[test]
fn derive_is_idempotent() {
    let requests = by_total();
    let filters = RequestFilters {
        search: Some("a".into()),
        ..RequestFilters::default()
    };
    let sort = SortState::default().toggled(SortColumn::Title);

    let first = derive(&requests, &filters, sort);
    let second = derive(&requests, &filters, sort);
    assert_eq!(first, second);
    assert_eq!(requests, by_total());
}

#[test]
fn applied_filters_are_trimmed_and_blank_means_absent() {
    let mut state = ListQueryState::new();
    state.apply_filters(RequestFilters {
        status: None,
        department: Some("   ".into()),
        search: Some("  laptop ".into()),
    });

    assert_eq!(state.filters().department, None);
    assert_eq!(state.filters().search.as_deref(), Some("laptop"));
    assert_eq!(state.to_query_string(), "search=laptop");

    state.reset_filters();
    assert!(state.filters().is_empty());
    assert_eq!(state.to_query_string(), "");
}

#[test]
fn query_string_seeds_filters_and_ignores_invalid_status() {
    let state = ListQueryState::from_query_string("?status=In+Progress&search=mac%20book&page=2");
    assert_eq!(state.filters().status, Some(RequestStatus::InProgress));
    assert_eq!(state.filters().search.as_deref(), Some("mac book"));
    assert_eq!(state.filters().department, None);

    let state = ListQueryState::from_query_string("status=Pending&department=");
    assert!(state.filters().is_empty());
}

#[test]
fn query_string_writes_back_present_filters() {
    let mut state = ListQueryState::new();
    state.apply_filters(RequestFilters {
        status: Some(RequestStatus::InProgress),
        department: Some("R&D".into()),
        search: None,
    });

    let query = state.to_query_string();
    assert_eq!(query, "status=In+Progress&department=R%26D");
    assert_eq!(ListQueryState::from_query_string(&query), state);
}

#[test]
fn status_filter_input_accepts_all_as_absent() {
    assert_eq!(parse_status_filter("all"), None);
    assert_eq!(parse_status_filter(" Closed "), Some(RequestStatus::Closed));
    assert_eq!(parse_status_filter("closed"), None);
}

#[test]
fn sort_columns_parse_from_names() {
    assert_eq!("total_cost".parse::<SortColumn>(), Ok(SortColumn::TotalCost));
    assert_eq!("vendor-name".parse::<SortColumn>(), Ok(SortColumn::VendorName));
    assert!("price".parse::<SortColumn>().is_err());
}
