use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

use crate::checker::{EntryOrigin, ManifestEntry};
use crate::importer::{StoreError, TimeseriesStore};
use crate::report::DiagnosticSink;
use crate::services::check_service::{CheckError, CheckOutcome, CheckService};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("Import of {file} failed: {source}")]
    Store { file: String, source: StoreError },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub files: usize,
    pub series_created: usize,
    pub records_appended: u64,
}

/// Drives a file-by-file import: runs the consistency check first and
/// refuses to import anything if it fails.
pub struct ImportService {
    dir: PathBuf,
    check: CheckService,
}

impl ImportService {
    pub fn new(dir: impl Into<PathBuf>, data_extension: impl Into<String>) -> Self {
        let dir = dir.into();
        let check = CheckService::new(&dir, data_extension);
        Self { dir, check }
    }

    /// Run the consistency check only.
    pub fn check(&self, sink: &mut dyn DiagnosticSink) -> Result<CheckOutcome, CheckError> {
        self.check.run(sink)
    }

    /// Check, then import every data file.
    pub fn run(
        &self,
        store: &mut dyn TimeseriesStore,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ImportStats, ImportError> {
        let outcome = self.check(sink)?;
        self.import_files(&outcome, store, |_| {})
    }

    /// Import the checked files, invoking `on_imported` after each one.
    ///
    /// A store failure aborts the run; whatever was already handed to the
    /// store stays with the store's own transaction handling.
    pub fn import_files(
        &self,
        outcome: &CheckOutcome,
        store: &mut dyn TimeseriesStore,
        mut on_imported: impl FnMut(&ManifestEntry),
    ) -> Result<ImportStats, ImportError> {
        let mut stats = ImportStats::default();

        for entry in &outcome.file_entries {
            let EntryOrigin::File { name } = &entry.origin else {
                continue;
            };
            let path = self.dir.join(name);

            match store.import_file(&entry.key, &path) {
                Ok(imported) => {
                    info!(
                        "Station {}, {} timeseries, {} + {} records",
                        entry.key.station_id,
                        if imported.created { "new" } else { "existing" },
                        imported.existing_records,
                        imported.appended_records
                    );
                    stats.files += 1;
                    if imported.created {
                        stats.series_created += 1;
                    }
                    stats.records_appended += imported.appended_records;
                    on_imported(entry);
                }
                Err(source) => {
                    error!("Import of {name} failed: {source}");
                    return Err(ImportError::Store {
                        file: name.clone(),
                        source,
                    });
                }
            }
        }

        info!(
            "Imported {} files, {} new series, {} records",
            stats.files, stats.series_created, stats.records_appended
        );
        Ok(stats)
    }
}
