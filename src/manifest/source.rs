use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

/// Raw cell value plus its type tag, as far as the checker cares: only
/// `Number` is a candidate integer ID.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
    /// Dates, booleans, error cells: typed content the manifest never accepts.
    Other,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Empty => CellValue::Empty,
            _ => CellValue::Other,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Empty => Ok(()),
            CellValue::Other => write!(f, "?"),
        }
    }
}

/// One sheet materialized as rows of cells.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    rows: Vec<Vec<CellValue>>,
}

const EMPTY: CellValue = CellValue::Empty;

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, col), 0-indexed; anything outside the used range reads
    /// as empty.
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }
}

/// Contract for the spreadsheet collaborator: named sheets of rows, each cell
/// carrying its value and type tag.
pub trait SpreadsheetSource {
    fn sheet(&mut self, name: &str) -> Result<Sheet, ManifestError>;
}

/// Spreadsheet source backed by a workbook file on disk.
///
/// `open_workbook_auto` handles xlsx, xls and ods, which covers every
/// spreadsheet extension the directory scanner accepts.
pub struct WorkbookSource {
    workbook: Sheets<BufReader<File>>,
}

impl WorkbookSource {
    pub fn open(path: &Path) -> Result<Self, ManifestError> {
        let workbook =
            open_workbook_auto(path).map_err(|e| ManifestError::WorkbookOpen(e.to_string()))?;
        Ok(Self { workbook })
    }
}

impl SpreadsheetSource for WorkbookSource {
    fn sheet(&mut self, name: &str) -> Result<Sheet, ManifestError> {
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|_| ManifestError::SheetNotFound(name.to_string()))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(CellValue::from_data).collect())
            .collect();
        Ok(Sheet::from_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workbook_open_fails_for_missing_file() {
        let result = WorkbookSource::open(Path::new("/nonexistent/manifest.xls"));
        assert!(matches!(result, Err(ManifestError::WorkbookOpen(_))));
    }

    #[test]
    fn out_of_range_cells_read_as_empty() {
        let sheet = Sheet::from_rows(vec![vec![CellValue::Number(1.0)]]);
        assert_eq!(*sheet.value(0, 0), CellValue::Number(1.0));
        assert!(sheet.value(0, 5).is_empty());
        assert!(sheet.value(9, 0).is_empty());
    }

    #[test]
    fn cell_value_display_matches_raw_content() {
        assert_eq!(CellValue::Number(7.0).to_string(), "7");
        assert_eq!(CellValue::Number(7.5).to_string(), "7.5");
        assert_eq!(CellValue::Text("abc".to_string()).to_string(), "abc");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
