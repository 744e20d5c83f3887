//! Postal-code validation against a reference catalog, with a
//! district-level fallback for codes the catalog does not know.

use std::collections::HashSet;

use crate::error::PipelineError;
use crate::model::{Cell, Table};
use crate::schema::{COL_COUNTRY, COL_POSTAL_RAW, COL_POSTAL_RESOLVED};

/// Strip non-digits and left-zero-pad to five characters. `None` when no
/// digits remain. Codes longer than five digits are kept as-is; the catalog
/// side goes through the same function so comparisons stay consistent.
pub fn normalize_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("{digits:0>5}"))
    }
}

/// Reference set of valid postal codes, stored normalized.
#[derive(Debug, Clone, Default)]
pub struct PostalCatalog {
    codes: HashSet<String>,
}

impl PostalCatalog {
    /// Build the catalog from a reference table. Rows whose code cell has no
    /// digits are skipped; extra columns are ignored.
    pub fn from_table(table: &Table, column: &str) -> Result<Self, PipelineError> {
        let idx = table
            .column_index(column)
            .ok_or_else(|| PipelineError::MissingCatalogColumn { column: column.to_string() })?;
        let codes = table
            .rows
            .iter()
            .filter_map(|row| row[idx].as_str().and_then(normalize_code))
            .collect();
        Ok(PostalCatalog { codes })
    }

    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PostalCatalog {
            codes: codes
                .into_iter()
                .filter_map(|c| normalize_code(c.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Resolve every lead's postal code against the catalog and append the
/// `cp_normalizado` column.
///
/// Per row:
/// - a country other than Spain (case-insensitive) clears the code first —
///   the catalog only covers domestic codes;
/// - an exact catalog match keeps the normalized code;
/// - no match falls back to the first two digits plus `000`;
/// - missing stays missing, no fallback.
pub fn resolve_postal_codes(mut table: Table, catalog: &PostalCatalog) -> Table {
    let code_idx = table.column_index(COL_POSTAL_RAW);
    let country_idx = table.column_index(COL_COUNTRY);

    let resolved: Vec<Cell> = table
        .rows
        .iter()
        .map(|row| {
            let domestic = match country_idx.and_then(|i| row[i].non_blank()) {
                Some(country) => country.eq_ignore_ascii_case("spain"),
                None => true, // no country on record: keep the code
            };
            if !domestic {
                return Cell::Missing;
            }
            match code_idx.and_then(|i| row[i].as_str()).and_then(normalize_code) {
                Some(code) if catalog.contains(&code) => Cell::Text(code),
                Some(code) if code.len() >= 2 => Cell::text(format!("{}000", &code[..2])),
                _ => Cell::Missing,
            }
        })
        .collect();

    table.push_column(COL_POSTAL_RESOLVED, resolved);
    table
}
