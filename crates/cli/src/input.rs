//! External reader/writer: file bytes in, `Table` values out, and the
//! cleaned table back to CSV. The pipeline itself never touches files.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use leadclean_pipeline::engine::load_csv_table;
use leadclean_pipeline::model::{Cell, Table};
use leadclean_pipeline::PipelineError;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Timestamps coming out of spreadsheet date cells are rendered day-first,
/// matching what the pipeline's date parser expects.
const SPREADSHEET_DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Read a leads or catalog file into a table, choosing the reader by file
/// extension: spreadsheets go through calamine, everything else is CSV.
pub fn read_table(path: &Path, delimiter: char) -> Result<Table, PipelineError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        read_spreadsheet(path)
    } else {
        let data = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Io(format!("cannot read {}: {e}", path.display())))?;
        load_csv_table(&data, delimiter as u8)
    }
}

/// First sheet only; first row is the header row.
fn read_spreadsheet(path: &Path) -> Result<Table, PipelineError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PipelineError::Io(format!("cannot open {}: {e}", path.display())))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::Io(format!("{} has no sheets", path.display())))?
        .map_err(|e| PipelineError::Io(format!("cannot read {}: {e}", path.display())))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| PipelineError::Io(format!("{} first sheet is empty", path.display())))?
        .iter()
        .map(|cell| data_to_cell(cell).as_str().unwrap_or("").to_string())
        .collect();

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(data_to_cell).collect());
    }
    Ok(table)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Missing,
        Data::String(s) => {
            if s.is_empty() {
                Cell::Missing
            } else {
                Cell::text(s.clone())
            }
        }
        // Integers without decimals, so phones and postal codes read from
        // numeric cells do not grow a trailing ".0".
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Cell::text(format!("{}", *n as i64))
            } else {
                Cell::text(format!("{n}"))
            }
        }
        Data::Int(n) => Cell::text(n.to_string()),
        Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) => Cell::text(ts.format(SPREADSHEET_DATETIME_FORMAT).to_string()),
            None => Cell::Missing,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.clone()),
        // Formula error cells carry no usable lead data.
        Data::Error(_) => Cell::Missing,
    }
}

/// Write the cleaned table as comma-separated CSV with a header row.
/// Missing cells become empty fields.
pub fn write_csv(path: &Path, table: &Table) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| PipelineError::Io(format!("cannot write {}: {e}", path.display())))?;
    writer
        .write_record(&table.columns)
        .map_err(|e| PipelineError::Csv(e.to_string()))?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.as_str().unwrap_or("")))
            .map_err(|e| PipelineError::Csv(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| PipelineError::Io(e.to_string()))?;
    Ok(())
}
