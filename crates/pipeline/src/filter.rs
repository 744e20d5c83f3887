//! Capture-date parsing and range filtering.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::PipelineError;
use crate::model::{Cell, StageReport, Table};
use crate::schema::COL_CAPTURE_DATE;

/// Canonical capture-timestamp format, day first.
pub const CAPTURE_FORMAT: &str = "%d/%m/%Y %H:%M";

const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

/// Parse a capture timestamp, day-first formats preferred. Never errors:
/// unparsable values are simply `None` and the row flows on as missing.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Retain rows whose capture timestamp falls in `[start 00:00, now]`
/// inclusive. Missing and unparsable timestamps are excluded. Surviving
/// cells are rewritten in the canonical `DD/MM/YYYY HH:MM` form.
pub fn filter_by_capture_date(
    mut table: Table,
    start: NaiveDate,
    now: NaiveDateTime,
) -> Result<(Table, StageReport), PipelineError> {
    let idx = table
        .column_index(COL_CAPTURE_DATE)
        .ok_or_else(|| PipelineError::MissingRequiredColumn(COL_CAPTURE_DATE.to_string()))?;

    let floor = start.and_time(NaiveTime::MIN);
    let rows_before = table.len();

    let mut kept = Vec::with_capacity(table.rows.len());
    for mut row in table.rows {
        let ts = match row[idx].as_str().and_then(parse_timestamp) {
            Some(ts) if ts >= floor && ts <= now => ts,
            _ => continue,
        };
        row[idx] = Cell::text(ts.format(CAPTURE_FORMAT).to_string());
        kept.push(row);
    }
    table.rows = kept;

    let report = StageReport::new(rows_before, table.len());
    Ok((table, report))
}
