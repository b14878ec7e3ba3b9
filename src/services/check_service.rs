use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::checker::{ManifestEntry, ManifestReconciler, ReconciliationError};
use crate::listing::{DirLister, DirectoryScanner, DocumentEntry, FileLister, ScanOutcome};
use crate::manifest::{ManifestLayout, ManifestReader, SpreadsheetSource, WorkbookSource};
use crate::report::DiagnosticSink;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(
        "There must be exactly one spreadsheet file in the directory, but I see {0}"
    )]
    SpreadsheetCount(usize),

    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a successful check hands to downstream consumers: the manifest name
/// and the validated, deduplicated entry lists.
#[derive(Debug)]
pub struct CheckOutcome {
    pub spreadsheet: String,
    pub spreadsheet_entries: Vec<ManifestEntry>,
    pub file_entries: Vec<ManifestEntry>,
    pub documents: Vec<DocumentEntry>,
}

/// Runs one full consistency check over a working directory: list, scan,
/// read the manifest, reconcile.
pub struct CheckService {
    dir: PathBuf,
    data_extension: String,
    layout: ManifestLayout,
}

impl CheckService {
    pub fn new(dir: impl Into<PathBuf>, data_extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            data_extension: data_extension.into(),
            layout: ManifestLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: ManifestLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Check the configured directory, opening the manifest workbook found
    /// there.
    pub fn run(&self, sink: &mut dyn DiagnosticSink) -> Result<CheckOutcome, CheckError> {
        let lister = DirLister::new(&self.dir);
        let filenames = lister.list()?;
        debug!("Listed {} entries in {:?}", filenames.len(), self.dir);

        let scan = DirectoryScanner::new(&self.data_extension).scan(&filenames, sink);
        if scan.spreadsheets.len() != 1 {
            return Err(CheckError::SpreadsheetCount(scan.spreadsheets.len()));
        }

        let spreadsheet = scan.spreadsheets[0].clone();
        let mut source = WorkbookSource::open(&self.dir.join(&spreadsheet))?;
        self.reconcile(spreadsheet, scan, &mut source, sink)
    }

    /// Reconcile an already-completed directory scan against an open
    /// spreadsheet source. Split out from [`run`](Self::run) so callers can
    /// inject both collaborators.
    pub fn reconcile(
        &self,
        spreadsheet: String,
        scan: ScanOutcome,
        source: &mut dyn SpreadsheetSource,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<CheckOutcome, CheckError> {
        let manifest = ManifestReader::new(self.layout.clone()).read(source, sink)?;

        let mut reconciler =
            ManifestReconciler::new(manifest.entries, scan.data_entries, &self.data_extension);
        if manifest.had_errors || scan.had_errors {
            reconciler.mark_input_errors();
        }
        reconciler.check(sink)?;

        let (spreadsheet_entries, file_entries) = reconciler.into_entries();
        info!(
            "Check passed: {} declared series, {} data files",
            spreadsheet_entries.len(),
            file_entries.len()
        );
        Ok(CheckOutcome {
            spreadsheet,
            spreadsheet_entries,
            file_entries,
            documents: scan.documents,
        })
    }
}
