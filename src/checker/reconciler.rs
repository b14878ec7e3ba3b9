use std::cmp::Ordering;
use thiserror::Error;

use crate::checker::entry::{merge_cmp, EntryOrigin, ManifestEntry};
use crate::report::{DiagnosticSink, Severity};

/// Aggregate failure raised by [`ManifestReconciler::check`].
///
/// Carries no individual messages; those have already been emitted through
/// the diagnostic sink during the run.
#[derive(Debug, Error)]
#[error("one or more errors occurred while checking the data files")]
pub struct ReconciliationError;

/// Reconciles the spreadsheet-declared manifest against the files found on
/// disk.
///
/// Both sides are held as in-memory sequences already materialized by the
/// manifest reader and the directory scanner; the reconciler itself touches
/// neither the filesystem nor the spreadsheet.
pub struct ManifestReconciler {
    spreadsheet_entries: Vec<ManifestEntry>,
    file_entries: Vec<ManifestEntry>,
    data_extension: String,
    had_errors: bool,
}

impl ManifestReconciler {
    pub fn new(
        spreadsheet_entries: Vec<ManifestEntry>,
        file_entries: Vec<ManifestEntry>,
        data_extension: impl Into<String>,
    ) -> Self {
        Self {
            spreadsheet_entries,
            file_entries,
            data_extension: data_extension.into(),
            had_errors: false,
        }
    }

    /// Record that validation upstream (cell parsing, filename parsing)
    /// already rejected entries, so `check` must fail even if the surviving
    /// entries reconcile cleanly.
    pub fn mark_input_errors(&mut self) {
        self.had_errors = true;
    }

    /// Validated spreadsheet entries, post-dedup once `find_duplicates` ran.
    pub fn spreadsheet_entries(&self) -> &[ManifestEntry] {
        &self.spreadsheet_entries
    }

    pub fn file_entries(&self) -> &[ManifestEntry] {
        &self.file_entries
    }

    /// Hand both entry lists to a downstream consumer.
    pub fn into_entries(self) -> (Vec<ManifestEntry>, Vec<ManifestEntry>) {
        (self.spreadsheet_entries, self.file_entries)
    }

    /// Flag spreadsheet rows that declare the same key triple and keep
    /// exactly one of each group.
    ///
    /// Entries are fully sorted by the composite key first; duplicates are
    /// exactly adjacent afterwards, so a single adjacent-pair scan finds them
    /// all. The later row wins within each pair.
    pub fn find_duplicates(&mut self, sink: &mut dyn DiagnosticSink) {
        self.spreadsheet_entries.sort_by_key(|entry| entry.key);

        let entries = std::mem::take(&mut self.spreadsheet_entries);
        let mut kept: Vec<ManifestEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            match kept.last_mut() {
                Some(prev) if prev.key == entry.key => {
                    self.had_errors = true;
                    sink.emit(
                        Severity::Error,
                        format!(
                            "Duplicate record in spreadsheet rows {} and {}",
                            origin_label(prev),
                            origin_label(&entry)
                        ),
                    );
                    *prev = entry;
                }
                _ => kept.push(entry),
            }
        }
        self.spreadsheet_entries = kept;
    }

    /// Merge-walk both sorted sides and report entries present on only one.
    ///
    /// An exhausted cursor compares as larger than any live entry (see
    /// [`merge_cmp`]), so the walk terminates once both cursors reach the
    /// end. Requires pre-sorted input and a deduplicated spreadsheet side;
    /// two files mapping to the same key are not flagged as duplicates here,
    /// the second one surfaces as unregistered instead.
    pub fn cross_check(&mut self, sink: &mut dyn DiagnosticSink) {
        self.spreadsheet_entries.sort_by_key(|entry| entry.key);
        self.file_entries.sort_by_key(|entry| entry.key);

        let mut i = 0;
        let mut j = 0;
        while i < self.spreadsheet_entries.len() || j < self.file_entries.len() {
            let declared = self.spreadsheet_entries.get(i);
            let present = self.file_entries.get(j);

            match merge_cmp(
                declared.map(|entry| &entry.key),
                present.map(|entry| &entry.key),
            ) {
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                Ordering::Greater => {
                    if let Some(entry) = present {
                        self.had_errors = true;
                        sink.emit(
                            Severity::Error,
                            format!(
                                "File {} is not registered in the spreadsheet",
                                origin_label(entry)
                            ),
                        );
                    }
                    j += 1;
                }
                Ordering::Less => {
                    if let Some(entry) = declared {
                        self.had_errors = true;
                        sink.emit(
                            Severity::Error,
                            format!(
                                "File {}.{} does not exist (spreadsheet row {})",
                                entry.key,
                                self.data_extension,
                                origin_label(entry)
                            ),
                        );
                    }
                    i += 1;
                }
            }
        }
    }

    /// Run the full check: duplicate scan, then cross-check.
    ///
    /// Fails iff any discrepancy was flagged during the run, including input
    /// errors recorded via [`mark_input_errors`].
    pub fn check(&mut self, sink: &mut dyn DiagnosticSink) -> Result<(), ReconciliationError> {
        self.find_duplicates(sink);
        self.cross_check(sink);
        if self.had_errors {
            Err(ReconciliationError)
        } else {
            Ok(())
        }
    }
}

fn origin_label(entry: &ManifestEntry) -> String {
    match &entry.origin {
        EntryOrigin::Spreadsheet { row } => row.to_string(),
        EntryOrigin::File { name } => name.clone(),
    }
}
