//! Per-cell canonicalization of contact fields.

use crate::model::{Cell, Table};
use crate::schema::{COL_EMAIL, COL_PHONE};

/// Keep digits only. Returns `None` when nothing remains — the caller treats
/// that as a missing value. No length validation and no re-padding.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Trim and lowercase. No format validation — deliberately permissive so
/// valid-but-unusual addresses are not silently dropped.
pub fn normalize_email(raw: &str) -> Option<String> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Canonicalize the phone and email columns in place. Either column may be
/// absent; sources vary and the dedup passes tolerate absence.
pub fn apply_contact_normalization(mut table: Table) -> Table {
    table.map_column(COL_PHONE, |cell| {
        cell.as_str().and_then(normalize_phone).into()
    });
    table.map_column(COL_EMAIL, |cell| {
        cell.as_str().and_then(normalize_email).into()
    });
    table
}
