//! Pipeline orchestration: threads one table through every stage and
//! assembles the export.

use chrono::{Local, NaiveDateTime};

use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::model::{Cell, RunMeta, RunOutput, RunReport, RunSummary, Table};
use crate::postal::PostalCatalog;
use crate::schema::{
    COL_BRAND, COL_CAPTURE_DATE, COL_CITY, COL_COUNTRY, COL_COURSE, COL_EMAIL, COL_FIRST_NAME,
    COL_GUIDE, COL_ID, COL_LAST_NAME, COL_ORIGIN, COL_PHONE, COL_POSTAL_RAW, COL_POSTAL_RESOLVED,
    COL_RECORD_SUBTYPE, COL_RECORD_TYPE, COL_SUBCHANNEL,
};
use crate::{dedupe, filter, normalize, postal, schema};

/// Course-name placeholder marking leads that never picked a course.
const COURSE_PLACEHOLDER: &str = "Ninguno";

/// Output column order. Absent columns are skipped (degraded sources).
const OUTPUT_COLUMNS: &[&str] = &[
    COL_ID,
    COL_CAPTURE_DATE,
    COL_FIRST_NAME,
    COL_LAST_NAME,
    COL_EMAIL,
    COL_PHONE,
    COL_ORIGIN,
    COL_GUIDE,
    COL_CITY,
    COL_POSTAL_RESOLVED,
    COL_RECORD_TYPE,
    COL_RECORD_SUBTYPE,
    COL_BRAND,
    COL_SUBCHANNEL,
];

/// Run the pipeline against the wall clock.
pub fn run(
    config: &RunConfig,
    leads: Table,
    catalog: &PostalCatalog,
) -> Result<RunOutput, PipelineError> {
    run_at(config, leads, catalog, Local::now().naive_local())
}

/// Run the pipeline with an explicit `now` (upper bound of the date filter
/// and timestamp of the report). One run owns its tables end to end; no
/// state survives it.
pub fn run_at(
    config: &RunConfig,
    leads: Table,
    catalog: &PostalCatalog,
    now: NaiveDateTime,
) -> Result<RunOutput, PipelineError> {
    let (table, warnings) = schema::reconcile(leads, config.strict_columns)?;
    let table = drop_placeholder_courses(table);

    let (table, date_report) = filter::filter_by_capture_date(table, config.start_date, now)?;
    let table = normalize::apply_contact_normalization(table);

    let (table, phone_report) = dedupe::dedupe_latest(
        table,
        COL_PHONE,
        COL_CAPTURE_DATE,
        config.drop_rows_without_phone,
    );
    let (table, email_report) = dedupe::dedupe_latest(
        table,
        COL_EMAIL,
        COL_CAPTURE_DATE,
        config.drop_rows_without_email,
    );

    let table = postal::resolve_postal_codes(table, catalog);
    let table = assemble(table, config);

    let summary = RunSummary {
        rows_before_date_filter: date_report.rows_before,
        rows_after_date_filter: date_report.rows_after,
        rows_after_phone_dedupe: phone_report.rows_after,
        rows_after_email_dedupe: email_report.rows_after,
        date_filter: date_report,
        phone_dedupe: phone_report,
        email_dedupe: email_report,
    };

    Ok(RunOutput {
        table,
        report: RunReport {
            meta: RunMeta {
                config_name: config.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
            },
            summary,
            warnings,
        },
    })
}

/// Leads whose course is the literal placeholder never entered a funnel;
/// drop them, then drop the filter-only column.
fn drop_placeholder_courses(mut table: Table) -> Table {
    if let Some(idx) = table.column_index(COL_COURSE) {
        table
            .rows
            .retain(|row| row[idx].non_blank() != Some(COURSE_PLACEHOLDER));
        table.drop_columns(&[COL_COURSE]);
    }
    table
}

/// Final shaping: namespace the identifier, stamp the constant
/// classification columns, drop working columns, fix the column order.
fn assemble(mut table: Table, config: &RunConfig) -> Table {
    if let Some(idx) = table.column_index(COL_ID) {
        for row in &mut table.rows {
            if let Cell::Text(id) = &mut row[idx] {
                *id = format!("{}{id}", config.id_prefix);
            }
        }
    }

    table.drop_columns(&[COL_POSTAL_RAW, COL_COUNTRY]);

    let classification = &config.classification;
    table.push_const_column(COL_RECORD_TYPE, &classification.tipo_registro);
    table.push_const_column(COL_RECORD_SUBTYPE, &classification.subtipo_registro);
    table.push_const_column(COL_BRAND, &classification.marca);
    table.push_const_column(COL_SUBCHANNEL, &classification.subcanal);

    table.select_columns(OUTPUT_COLUMNS)
}

/// Parse CSV text with a header row into a table. Empty fields become
/// missing cells; short rows are padded.
pub fn load_csv_table(data: &str, delimiter: u8) -> Result<Table, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::Csv(e.to_string()))?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Cell::Missing
                } else {
                    Cell::text(field)
                }
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}
