//! Date representation helpers.
//!
//! Three representations are in play:
//! - **edit**: what a native date input produces, `YYYY-MM-DD`
//! - **display**: what clinic staff and patients read, `DD/MM/YYYY` (pt-BR)
//! - **wire**: what the submission endpoint expects for `nascimento`, also `DD/MM/YYYY`
//!
//! None of these functions fail. Empty input yields an empty string and input that cannot be
//! interpreted is passed through untouched, so a caller can always render *something*.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DISPLAY_DATE: &str = "%d/%m/%Y";
const DISPLAY_DATE_TIME: &str = "%d/%m/%Y %H:%M";

/// Format an ISO date or timestamp as `DD/MM/YYYY`.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the date is taken in the timestamp's own offset)
/// and offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps.
pub fn format_for_display(iso_date: &str) -> String {
    let trimmed = iso_date.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_iso(trimmed) {
        Some(dt) => dt.format(DISPLAY_DATE).to_string(),
        None => iso_date.to_string(),
    }
}

/// Format an ISO timestamp as `DD/MM/YYYY HH:MM`.
///
/// A plain date is shown at midnight. Same empty/pass-through rules as [`format_for_display`].
pub fn format_datetime_for_display(iso_timestamp: &str) -> String {
    let trimmed = iso_timestamp.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_iso(trimmed) {
        Some(dt) => dt.format(DISPLAY_DATE_TIME).to_string(),
        None => iso_timestamp.to_string(),
    }
}

/// Convert a native date-input value (`YYYY-MM-DD`) into the backend's `DD/MM/YYYY`.
///
/// Only the shape is rearranged: the value is split on `-` and, when exactly three parts come
/// back, they are reversed and joined with `/`. Anything else is returned unchanged.
pub fn edit_to_wire_date(edit_date: &str) -> String {
    let parts: Vec<&str> = edit_date.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => format!("{day}/{month}/{year}"),
        _ => edit_date.to_string(),
    }
}

fn parse_iso(value: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
