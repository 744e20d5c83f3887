//! Reconciliation of heterogeneous source column names onto the canonical
//! schema.
//!
//! Source files come from several form providers and the headers drift:
//! accents, historical typos, renamed exports. Matching is done on the
//! trimmed lower-cased header, through a fixed alias table.

use std::collections::{HashMap, HashSet};

use crate::error::PipelineError;
use crate::model::Table;

pub const COL_ID: &str = "id";
pub const COL_CAPTURE_DATE: &str = "fecha_captacion";
pub const COL_FIRST_NAME: &str = "name";
pub const COL_LAST_NAME: &str = "surname";
pub const COL_EMAIL: &str = "email";
pub const COL_PHONE: &str = "telefono";
pub const COL_ORIGIN: &str = "origen_dato";
pub const COL_GUIDE: &str = "nombre_guia_master";
pub const COL_COURSE: &str = "nombre_curso";
pub const COL_CITY: &str = "poblacion";
pub const COL_POSTAL_RAW: &str = "cp";
pub const COL_COUNTRY: &str = "locate_pais";
pub const COL_POSTAL_RESOLVED: &str = "cp_normalizado";
pub const COL_RECORD_TYPE: &str = "tipo_registro";
pub const COL_RECORD_SUBTYPE: &str = "subtipo_registro";
pub const COL_BRAND: &str = "marca";
pub const COL_SUBCHANNEL: &str = "subcanal";

/// Known source spellings, normalized form → canonical name.
/// `localte_ciudad` is a historical typo that still ships in old exports.
const ALIASES: &[(&str, &str)] = &[
    ("fecha", COL_CAPTURE_DATE),
    ("utm_campaign", COL_ORIGIN),
    ("nombre_webinar", COL_GUIDE),
    ("locate_ciudad", COL_CITY),
    ("localte_ciudad", COL_CITY),
    ("teléfono", COL_PHONE),
    ("phone", COL_PHONE),
    ("locate_cp", COL_POSTAL_RAW),
];

/// Canonical columns the pipeline consumes, in selection order.
const SELECTED: &[&str] = &[
    COL_ID,
    COL_CAPTURE_DATE,
    COL_FIRST_NAME,
    COL_LAST_NAME,
    COL_EMAIL,
    COL_PHONE,
    COL_ORIGIN,
    COL_GUIDE,
    COL_COURSE,
    COL_CITY,
    COL_POSTAL_RAW,
    COL_COUNTRY,
];

/// Columns later stages cannot run without, regardless of strictness.
const REQUIRED: &[&str] = &[COL_ID, COL_CAPTURE_DATE];

/// Map source headers onto the canonical schema and select the columns the
/// pipeline consumes.
///
/// Rules:
/// - headers match on their trimmed lower-cased form;
/// - a column already carrying a canonical name claims it outright, so
///   reconciliation is idempotent;
/// - among aliases competing for the same canonical name, the first one in
///   column order wins and the others keep their original header;
/// - absent optional columns produce a warning (or an error when `strict`);
/// - absent required columns abort the run.
pub fn reconcile(table: Table, strict: bool) -> Result<(Table, Vec<String>), PipelineError> {
    let mut table = table;
    let canonical: HashSet<&str> = SELECTED.iter().copied().collect();
    let alias_map: HashMap<&str, &str> = ALIASES.iter().copied().collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut new_names: Vec<String> = Vec::with_capacity(table.columns.len());

    // Pass 1: columns whose normalized header is already canonical claim
    // their name first. This blocks alias renames onto an occupied target.
    for name in &table.columns {
        let norm = name.trim().to_lowercase();
        if canonical.contains(norm.as_str()) {
            taken.insert(norm);
        }
    }

    // Pass 2: apply aliases in column order; losers keep their header.
    for name in &table.columns {
        let norm = name.trim().to_lowercase();
        if canonical.contains(norm.as_str()) {
            new_names.push(norm);
            continue;
        }
        if let Some(&target) = alias_map.get(norm.as_str()) {
            if !taken.contains(target) {
                taken.insert(target.to_string());
                new_names.push(target.to_string());
                continue;
            }
        }
        new_names.push(name.clone());
    }
    table.columns = new_names;

    let mut warnings = Vec::new();
    for &name in SELECTED {
        if table.has_column(name) {
            continue;
        }
        if REQUIRED.contains(&name) || strict {
            return Err(PipelineError::MissingRequiredColumn(name.to_string()));
        }
        warnings.push(format!("column '{name}' not found in source; continuing without it"));
    }

    Ok((table.select_columns(SELECTED), warnings))
}
