use super::*;

#[test]
fn new_draft_has_one_untouched_line() {
    let draft = RequestDraft::new();
    assert_eq!(draft.lines.len(), 1);
    assert!(draft.lines_untouched());
    assert_eq!(draft.total_cost(), 0.0);
}

#[test]
fn price_or_quantity_change_rederives_line_total() {
    let cases = [
        ("1000", "2", 2000.0),
        ("19,99", "3", 59.97),
        ("2,5", "4", 10.0),
        ("12.5", "0", 0.0),
        ("0", "7", 0.0),
    ];
    for (price, quantity, expected) in cases {
        let line = create_line(1);
        let line = update_line(&line, LineField::UnitPrice, price);
        let line = update_line(&line, LineField::Quantity, quantity);
        assert_eq!(line.line_total, expected, "price={price} quantity={quantity}");
    }
}

#[test]
fn editing_total_directly_does_not_rederive() {
    let line = update_line(&create_line(1), LineField::UnitPrice, "10");
    let line = update_line(&line, LineField::Quantity, "2");
    let line = update_line(&line, LineField::LineTotal, "25");
    assert_eq!(line.line_total, 25.0);
    assert_eq!(line.unit_price, 10.0);
}

#[test]
fn unparseable_and_negative_input_become_zero() {
    let line = update_line(&create_line(1), LineField::UnitPrice, "ten");
    assert_eq!(line.unit_price, 0.0);
    let line = update_line(&line, LineField::Quantity, "-3");
    assert_eq!(line.quantity, 0.0);
}

#[test]
fn added_lines_get_fresh_keys_even_after_removal() {
    let mut draft = RequestDraft::new();
    let first = draft.add_line();
    assert!(draft.remove_line(1).is_some());
    let second = draft.add_line();
    assert_ne!(first, second);
    assert_ne!(draft.lines[0].key, second);
    assert!(draft.remove_line(10).is_none());
}

#[test]
fn total_cost_sums_and_rounds_line_totals() {
    let mut draft = RequestDraft::new();
    draft.update_line(0, LineField::LineTotal, "0.1");
    draft.add_line();
    draft.update_line(1, LineField::LineTotal, "0.2");
    assert_eq!(draft.total_cost(), 0.3);
}

#[test]
fn payload_is_trimmed_and_omits_local_keys() {
    let mut draft = RequestDraft::new();
    draft.requestor_name = "  Jane ".into();
    draft.title = "Laptop\n".into();
    draft.vendor_name = " Acme".into();
    draft.department = "IT ".into();
    draft.update_line(0, LineField::Description, " MacBook Pro ");
    draft.update_line(0, LineField::UnitPrice, "1000");
    draft.update_line(0, LineField::Quantity, "2");

    let payload = draft.to_payload();
    assert_eq!(payload.requestor_name, "Jane");
    assert_eq!(payload.title, "Laptop");
    assert_eq!(payload.vendor_name, "Acme");
    assert_eq!(payload.department, "IT");
    assert_eq!(payload.commodity_group, None);
    assert_eq!(payload.total_cost, 2000.0);
    assert_eq!(payload.order_lines[0].id, None);
    assert_eq!(payload.order_lines[0].position_description, "MacBook Pro");

    let json = serde_json::to_value(&payload).expect("serialize");
    assert!(json["order_lines"][0].get("id").is_none());
}
