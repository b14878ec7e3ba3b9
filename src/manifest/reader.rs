use std::collections::HashSet;

use tracing::debug;

use crate::checker::{EntryKey, ManifestEntry};
use crate::manifest::source::{CellValue, ManifestError, Sheet, SpreadsheetSource};
use crate::report::{DiagnosticSink, Severity};

/// Where the manifest lives inside the workbook: sheet names, key columns,
/// and the first data row of the time-series sheet (two header rows above).
#[derive(Debug, Clone)]
pub struct ManifestLayout {
    pub steps_sheet: String,
    pub variables_sheet: String,
    pub stations_sheet: String,
    pub timeseries_sheet: String,
    pub station_col: usize,
    pub variable_col: usize,
    pub step_col: usize,
    pub first_data_row: usize,
}

impl Default for ManifestLayout {
    fn default() -> Self {
        Self {
            steps_sheet: "Βήματα".to_string(),
            variables_sheet: "Μεταβλητές".to_string(),
            stations_sheet: "Σταθμοί".to_string(),
            timeseries_sheet: "Χρονοσειρές".to_string(),
            station_col: 0,
            variable_col: 4,
            step_col: 6,
            first_data_row: 2,
        }
    }
}

/// Validated spreadsheet entries plus whether any row was rejected on the way.
#[derive(Debug)]
pub struct ManifestEntries {
    pub entries: Vec<ManifestEntry>,
    pub had_errors: bool,
}

/// Reads the manifest workbook: collects the valid-ID sets from the lookup
/// sheets, then builds one entry per well-formed time-series row.
#[derive(Debug, Default)]
pub struct ManifestReader {
    layout: ManifestLayout,
}

impl ManifestReader {
    pub fn new(layout: ManifestLayout) -> Self {
        Self { layout }
    }

    pub fn read(
        &self,
        source: &mut dyn SpreadsheetSource,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ManifestEntries, ManifestError> {
        let layout = &self.layout;

        let step_ids = id_column(&source.sheet(&layout.steps_sheet)?);
        let variable_ids = id_column(&source.sheet(&layout.variables_sheet)?);
        let station_ids = id_column(&source.sheet(&layout.stations_sheet)?);
        debug!(
            "Loaded valid IDs: {} steps, {} variables, {} stations",
            step_ids.len(),
            variable_ids.len(),
            station_ids.len()
        );

        let sheet = source.sheet(&layout.timeseries_sheet)?;

        let mut entries = Vec::new();
        let mut had_errors = false;
        for row in layout.first_data_row..sheet.n_rows() {
            let station_cell = sheet.value(row, layout.station_col);
            let variable_cell = sheet.value(row, layout.variable_col);
            let step_cell = sheet.value(row, layout.step_col);

            if station_cell.is_empty() && variable_cell.is_empty() && step_cell.is_empty() {
                continue;
            }

            // Validate all three cells so every bad one gets reported, then
            // drop the row if any failed.
            let station = integer_cell(station_cell, row, layout.station_col, &station_ids, sink);
            let variable =
                integer_cell(variable_cell, row, layout.variable_col, &variable_ids, sink);
            let step = integer_cell(step_cell, row, layout.step_col, &step_ids, sink);

            match (station, variable, step) {
                (Some(station), Some(variable), Some(step)) => {
                    entries.push(ManifestEntry::from_row(
                        EntryKey::new(station, variable, step),
                        (row + 1) as u32,
                    ));
                }
                _ => had_errors = true,
            }
        }

        debug!("Read {} manifest entries", entries.len());
        Ok(ManifestEntries {
            entries,
            had_errors,
        })
    }
}

/// IDs declared in a lookup sheet: column 0, below the header row. Only
/// numeric cells count.
fn id_column(sheet: &Sheet) -> HashSet<u64> {
    let mut ids = HashSet::new();
    for row in 1..sheet.n_rows() {
        if let CellValue::Number(n) = sheet.value(row, 0) {
            if *n >= 0.0 {
                ids.insert(n.trunc() as u64);
            }
        }
    }
    ids
}

/// A numeric cell whose truncated integer value is in the accepted set;
/// anything else is reported and rejected.
fn integer_cell(
    value: &CellValue,
    row: usize,
    col: usize,
    accepted: &HashSet<u64>,
    sink: &mut dyn DiagnosticSink,
) -> Option<u64> {
    let candidate = match value {
        CellValue::Number(n) if *n >= 0.0 => Some(n.trunc() as u64),
        _ => None,
    };
    match candidate {
        Some(id) if accepted.contains(&id) => Some(id),
        _ => {
            sink.emit(
                Severity::Error,
                format!(
                    "Wrong cell value in {}{}; \"{}\" not in accepted values",
                    column_letter(col),
                    row + 1,
                    value
                ),
            );
            None
        }
    }
}

/// Spreadsheet-style column label: A..Z, AA, AB, ...
fn column_letter(col: usize) -> String {
    let mut col = col;
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::EntryOrigin;
    use crate::report::MemorySink;
    use std::collections::HashMap;

    struct FakeSource {
        sheets: HashMap<String, Sheet>,
    }

    impl FakeSource {
        fn new(sheets: Vec<(&str, Vec<Vec<CellValue>>)>) -> Self {
            Self {
                sheets: sheets
                    .into_iter()
                    .map(|(name, rows)| (name.to_string(), Sheet::from_rows(rows)))
                    .collect(),
            }
        }
    }

    impl SpreadsheetSource for FakeSource {
        fn sheet(&mut self, name: &str) -> Result<Sheet, ManifestError> {
            self.sheets
                .get(name)
                .cloned()
                .ok_or_else(|| ManifestError::SheetNotFound(name.to_string()))
        }
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn lookup_sheet(ids: &[f64]) -> Vec<Vec<CellValue>> {
        let mut rows = vec![vec![text("id")]];
        rows.extend(ids.iter().map(|id| vec![num(*id)]));
        rows
    }

    /// Time-series row with the key cells at columns 0, 4 and 6.
    fn series_row(station: CellValue, variable: CellValue, step: CellValue) -> Vec<CellValue> {
        vec![
            station,
            CellValue::Empty,
            CellValue::Empty,
            CellValue::Empty,
            variable,
            CellValue::Empty,
            step,
        ]
    }

    fn source_with_rows(rows: Vec<Vec<CellValue>>) -> FakeSource {
        let mut series = vec![vec![text("header")], vec![text("header")]];
        series.extend(rows);
        FakeSource::new(vec![
            ("Βήματα", lookup_sheet(&[1.0, 2.0])),
            ("Μεταβλητές", lookup_sheet(&[1.0, 5.0])),
            ("Σταθμοί", lookup_sheet(&[10.0, 20.0])),
            ("Χρονοσειρές", series),
        ])
    }

    #[test]
    fn well_formed_rows_become_entries_with_their_row_number() {
        let mut source = source_with_rows(vec![
            series_row(num(10.0), num(1.0), num(1.0)),
            series_row(num(20.0), num(5.0), num(2.0)),
        ]);
        let mut sink = MemorySink::new();

        let manifest = ManifestReader::default().read(&mut source, &mut sink).unwrap();

        assert!(!manifest.had_errors);
        assert!(sink.messages.is_empty());
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[0].key, EntryKey::new(10, 1, 1));
        assert_eq!(
            manifest.entries[0].origin,
            EntryOrigin::Spreadsheet { row: 3 }
        );
        assert_eq!(
            manifest.entries[1].origin,
            EntryOrigin::Spreadsheet { row: 4 }
        );
    }

    #[test]
    fn blank_rows_are_skipped_silently() {
        let mut source = source_with_rows(vec![
            series_row(CellValue::Empty, CellValue::Empty, CellValue::Empty),
            series_row(num(10.0), num(1.0), num(1.0)),
        ]);
        let mut sink = MemorySink::new();

        let manifest = ManifestReader::default().read(&mut source, &mut sink).unwrap();

        assert!(!manifest.had_errors);
        assert!(sink.messages.is_empty());
        assert_eq!(manifest.entries.len(), 1);
    }

    #[test]
    fn text_cell_is_reported_with_column_letter_and_row() {
        let mut source = source_with_rows(vec![series_row(text("abc"), num(1.0), num(1.0))]);
        let mut sink = MemorySink::new();

        let manifest = ManifestReader::default().read(&mut source, &mut sink).unwrap();

        assert!(manifest.had_errors);
        assert!(manifest.entries.is_empty());
        assert_eq!(
            sink.errors(),
            vec!["Wrong cell value in A3; \"abc\" not in accepted values"]
        );
    }

    #[test]
    fn number_outside_accepted_set_is_rejected() {
        let mut source = source_with_rows(vec![series_row(num(10.0), num(9.0), num(1.0))]);
        let mut sink = MemorySink::new();

        let manifest = ManifestReader::default().read(&mut source, &mut sink).unwrap();

        assert!(manifest.had_errors);
        assert!(manifest.entries.is_empty());
        assert_eq!(
            sink.errors(),
            vec!["Wrong cell value in E3; \"9\" not in accepted values"]
        );
    }

    #[test]
    fn every_bad_cell_in_a_row_is_reported() {
        let mut source = source_with_rows(vec![series_row(text("x"), text("y"), num(1.0))]);
        let mut sink = MemorySink::new();

        let manifest = ManifestReader::default().read(&mut source, &mut sink).unwrap();

        assert!(manifest.had_errors);
        assert_eq!(sink.errors().len(), 2);
    }

    #[test]
    fn fractional_ids_truncate_like_integer_conversion() {
        // 10.7 truncates to 10, which is an accepted station.
        let mut source = source_with_rows(vec![series_row(num(10.7), num(1.0), num(2.0))]);
        let mut sink = MemorySink::new();

        let manifest = ManifestReader::default().read(&mut source, &mut sink).unwrap();

        assert!(!manifest.had_errors);
        assert_eq!(manifest.entries[0].key, EntryKey::new(10, 1, 2));
    }

    #[test]
    fn missing_lookup_sheet_is_a_hard_error() {
        let mut source = FakeSource::new(vec![("Βήματα", lookup_sheet(&[1.0]))]);
        let mut sink = MemorySink::new();

        let result = ManifestReader::default().read(&mut source, &mut sink);
        assert!(matches!(result, Err(ManifestError::SheetNotFound(_))));
    }

    #[test]
    fn column_letters_extend_past_z() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(4), "E");
        assert_eq!(column_letter(6), "G");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
    }
}
