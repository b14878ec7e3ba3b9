use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::checker::EntryKey;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Store error: {0}")]
    Backend(String),
}

/// Result of importing one data file into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Whether the time series was created by this import.
    pub created: bool,
    /// Records the series held before the import.
    pub existing_records: u64,
    /// Records appended from the file.
    pub appended_records: u64,
}

/// Boundary to the persistence collaborator. Implementations own their
/// storage format and any transaction handling.
pub trait TimeseriesStore {
    fn import_file(&mut self, key: &EntryKey, path: &Path) -> Result<ImportOutcome, StoreError>;
}

/// Store that verifies the file is readable and counts the records it would
/// append, without persisting anything.
#[derive(Debug, Default)]
pub struct DryRunStore;

impl TimeseriesStore for DryRunStore {
    fn import_file(&mut self, _key: &EntryKey, path: &Path) -> Result<ImportOutcome, StoreError> {
        let contents = fs::read_to_string(path)?;
        let records = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count() as u64;

        Ok(ImportOutcome {
            created: true,
            existing_records: 0,
            appended_records: records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_store_counts_non_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1-1-1.hts");
        fs::write(&path, "2009-01-01 00:00,1.5,\n\n2009-01-01 01:00,0.0,\n").unwrap();

        let mut store = DryRunStore;
        let outcome = store
            .import_file(&EntryKey::new(1, 1, 1), &path)
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.existing_records, 0);
        assert_eq!(outcome.appended_records, 2);
        // The file is untouched.
        assert!(fs::read_to_string(&path).unwrap().contains("1.5"));
    }

    #[test]
    fn dry_run_store_fails_on_missing_file() {
        let mut store = DryRunStore;
        let result = store.import_file(&EntryKey::new(1, 1, 1), Path::new("/nonexistent/1-1-1.hts"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
