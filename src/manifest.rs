// Manifest workbook handling: the spreadsheet-source contract, the
// calamine-backed implementation, and the reader that turns sheet rows into
// validated manifest entries.

pub mod reader;
pub mod source;

pub use reader::{ManifestEntries, ManifestLayout, ManifestReader};
pub use source::{CellValue, ManifestError, Sheet, SpreadsheetSource, WorkbookSource};
