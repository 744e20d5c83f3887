//! Latest-wins deduplication by a single key column.
//!
//! Applied twice per run: once keyed on the phone, then on the email. The
//! order matters — the phone pass decides which duplicate survives before
//! the email pass ever sees the table.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::filter::parse_timestamp;
use crate::model::{StageReport, Table};

/// Collapse rows sharing a key, keeping the one with the newest timestamp.
///
/// - `drop_missing_keys` removes rows whose key is missing or blank before
///   grouping; otherwise such rows all survive — missing keys are never
///   deduplicated against each other.
/// - Timestamp ties keep the earliest-positioned row; a row with an
///   unparsable timestamp loses to any row with a parsed one.
/// - Surviving rows preserve their original relative order.
/// - An absent key column makes the pass a no-op (sources vary).
pub fn dedupe_latest(
    mut table: Table,
    key_column: &str,
    timestamp_column: &str,
    drop_missing_keys: bool,
) -> (Table, StageReport) {
    let rows_before = table.len();
    let Some(key_idx) = table.column_index(key_column) else {
        return (table, StageReport::pass_through(rows_before));
    };
    let ts_idx = table.column_index(timestamp_column);

    if drop_missing_keys {
        table.rows.retain(|row| row[key_idx].non_blank().is_some());
    }

    let mut keep = vec![true; table.rows.len()];
    let mut winners: HashMap<String, (usize, Option<chrono::NaiveDateTime>)> = HashMap::new();

    for (i, row) in table.rows.iter().enumerate() {
        let Some(key) = row[key_idx].non_blank() else {
            continue; // null keys never match each other
        };
        let ts = ts_idx
            .and_then(|t| row[t].as_str())
            .and_then(parse_timestamp);

        match winners.entry(key.to_string()) {
            Entry::Occupied(mut slot) => {
                let (held_row, held_ts) = *slot.get();
                // Option ordering puts None below any parsed timestamp, and
                // strict comparison keeps the earlier row on ties.
                if ts > held_ts {
                    keep[held_row] = false;
                    slot.insert((i, ts));
                } else {
                    keep[i] = false;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert((i, ts));
            }
        }
    }

    let mut i = 0;
    table.rows.retain(|_| {
        let kept = keep[i];
        i += 1;
        kept
    });

    let report = StageReport::new(rows_before, table.len());
    (table, report)
}
