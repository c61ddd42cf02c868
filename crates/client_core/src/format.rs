//! Display helpers for amounts, timestamps and table headers (de-DE style).

use chrono::{DateTime, TimeZone, Utc};
use shared::numeric::round2;

use crate::list_query::{SortColumn, SortDirection, SortState};

const SHORT_ID_LEN: usize = 8;

/// `1234.5` becomes `1.234,50 €` (non-breaking space before the sign).
pub fn format_currency(amount: f64) -> String {
    let amount = round2(amount);
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped},{cents}\u{a0}€")
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%d.%m.%Y, %H:%M").to_string()
}

pub fn short_id(id: &str) -> String {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((cut, _)) => format!("{}…", &id[..cut]),
        None => id.to_string(),
    }
}

pub fn sort_indicator(sort: SortState, column: SortColumn) -> &'static str {
    if sort.column != column {
        return "<>";
    }
    match sort.direction {
        SortDirection::Ascending => "^",
        SortDirection::Descending => "v",
    }
}
