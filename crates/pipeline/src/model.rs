use serde::Serialize;

// ---------------------------------------------------------------------------
// Cells and tables
// ---------------------------------------------------------------------------

/// A single loosely-typed cell produced by an external reader.
///
/// Blank text is still `Text` — whether a blank counts as missing is decided
/// by the normalizers, not by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    Text(String),
    #[default]
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            Cell::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Trimmed non-blank text content, or `None` for blanks and missing.
    pub fn non_blank(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            Cell::Missing => None,
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(s) => Cell::Text(s),
            None => Cell::Missing,
        }
    }
}

/// An in-memory table: ordered column names plus rows of cells.
///
/// Every row holds exactly `columns.len()` cells; `push_row` pads or
/// truncates to keep that invariant. Stages consume a table and return a
/// new state, so no two stages ever observe the same table concurrently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table { columns, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    /// Project onto `names`, keeping their order. Absent names are skipped.
    pub fn select_columns(&self, names: &[&str]) -> Table {
        let indices: Vec<usize> = names
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect();
        let columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table { columns, rows }
    }

    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i].as_str()))
            .collect();
        if keep.len() == self.columns.len() {
            return;
        }
        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            *row = keep.iter().map(|&i| row[i].clone()).collect();
        }
    }

    /// Append a column. `cells` is padded with `Missing` when shorter than
    /// the row count.
    pub fn push_column(&mut self, name: &str, mut cells: Vec<Cell>) {
        cells.resize(self.rows.len(), Cell::Missing);
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
    }

    /// Append a column holding the same text in every row.
    pub fn push_const_column(&mut self, name: &str, value: &str) {
        let cells = vec![Cell::text(value); self.rows.len()];
        self.push_column(name, cells);
    }

    /// Rewrite every cell of a column. Returns false when the column is
    /// absent (sources vary; absence is not an error here).
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Cell) -> Cell,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Row counts for one pipeline stage.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StageReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
}

impl StageReport {
    pub fn new(rows_before: usize, rows_after: usize) -> Self {
        StageReport {
            rows_before,
            rows_after,
            rows_removed: rows_before - rows_after,
        }
    }

    /// A stage that saw the table but changed nothing.
    pub fn pass_through(rows: usize) -> Self {
        StageReport::new(rows, rows)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_before_date_filter: usize,
    pub rows_after_date_filter: usize,
    pub rows_after_phone_dedupe: usize,
    pub rows_after_email_dedupe: usize,
    pub date_filter: StageReport,
    pub phone_dedupe: StageReport,
    pub email_dedupe: StageReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

/// Serializable portion of a run: what happened, not the data itself.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub warnings: Vec<String>,
}

/// Final table plus the report. The table goes to the external writer.
#[derive(Debug)]
pub struct RunOutput {
    pub table: Table,
    pub report: RunReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(columns: &[&str]) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn push_row_pads_to_width() {
        let mut table = t(&["a", "b", "c"]);
        table.push_row(vec![Cell::text("1")]);
        assert_eq!(table.rows[0].len(), 3);
        assert!(table.rows[0][2].is_missing());
    }

    #[test]
    fn select_skips_absent_columns() {
        let mut table = t(&["a", "b"]);
        table.push_row(vec![Cell::text("1"), Cell::text("2")]);
        let selected = table.select_columns(&["b", "zzz", "a"]);
        assert_eq!(selected.columns, vec!["b", "a"]);
        assert_eq!(selected.rows[0], vec![Cell::text("2"), Cell::text("1")]);
    }

    #[test]
    fn drop_columns_keeps_row_alignment() {
        let mut table = t(&["a", "b", "c"]);
        table.push_row(vec![Cell::text("1"), Cell::text("2"), Cell::text("3")]);
        table.drop_columns(&["b"]);
        assert_eq!(table.columns, vec!["a", "c"]);
        assert_eq!(table.rows[0], vec![Cell::text("1"), Cell::text("3")]);
    }

    #[test]
    fn non_blank_treats_whitespace_as_missing() {
        assert_eq!(Cell::text("  ").non_blank(), None);
        assert_eq!(Cell::text(" x ").non_blank(), Some("x"));
        assert_eq!(Cell::Missing.non_blank(), None);
    }

    #[test]
    fn stage_report_counts() {
        let report = StageReport::new(10, 7);
        assert_eq!(report.rows_removed, 3);
        let report = StageReport::pass_through(5);
        assert_eq!(report.rows_removed, 0);
    }
}
