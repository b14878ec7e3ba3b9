use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::checker::{EntryKey, ManifestEntry};
use crate::report::{DiagnosticSink, Severity};

/// Extensions recognized as the manifest spreadsheet.
pub const SPREADSHEET_EXTENSIONS: [&str; 3] = ["xls", "xlsx", "ods"];

/// Flat listing of the working directory. Behind a trait so the scanner and
/// the services stay a pure function of the names they are given.
pub trait FileLister {
    fn list(&self) -> io::Result<Vec<String>>;
}

/// Lists regular files in one directory; does not recurse.
pub struct DirLister {
    dir: PathBuf,
}

impl DirLister {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileLister for DirLister {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        // Deterministic scan order regardless of filesystem.
        names.sort();
        Ok(names)
    }
}

/// Parse a data filename of the form `<station>-<variable>-<step>.<ext>`.
///
/// The pattern is strict: nothing before or after the triple is allowed.
pub fn parse_data_filename(name: &str, extension: &str) -> Option<EntryKey> {
    let pattern = format!(r"^(\d+)-(\d+)-(\d+)\.{}$", regex::escape(extension));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(name)?;

    let station_id = caps.get(1)?.as_str().parse().ok()?;
    let variable_id = caps.get(2)?.as_str().parse().ok()?;
    let step_id = caps.get(3)?.as_str().parse().ok()?;
    Some(EntryKey::new(station_id, variable_id, step_id))
}

/// A side document (pdf) accompanying the data files. Documents are named
/// leniently: a full key triple, or just a leading station ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub station_id: u64,
    pub key: Option<EntryKey>,
    pub filename: String,
}

fn parse_document_filename(name: &str) -> Option<DocumentEntry> {
    let full = Regex::new(r"^(\d+)-(\d+)-(\d+).*\.pdf$").ok()?;
    if let Some(caps) = full.captures(name) {
        let station_id = caps.get(1)?.as_str().parse().ok()?;
        let variable_id = caps.get(2)?.as_str().parse().ok()?;
        let step_id = caps.get(3)?.as_str().parse().ok()?;
        return Some(DocumentEntry {
            station_id,
            key: Some(EntryKey::new(station_id, variable_id, step_id)),
            filename: name.to_string(),
        });
    }

    let station_only = Regex::new(r"^(\d+).*\.pdf$").ok()?;
    let caps = station_only.captures(name)?;
    let station_id = caps.get(1)?.as_str().parse().ok()?;
    Some(DocumentEntry {
        station_id,
        key: None,
        filename: name.to_string(),
    })
}

/// What a directory scan produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub spreadsheets: Vec<String>,
    pub data_entries: Vec<ManifestEntry>,
    pub documents: Vec<DocumentEntry>,
    pub had_errors: bool,
}

/// Classifies directory entries into the manifest spreadsheet, data files and
/// side documents. Files with any other extension are ignored.
pub struct DirectoryScanner {
    data_extension: String,
}

impl DirectoryScanner {
    pub fn new(data_extension: impl Into<String>) -> Self {
        Self {
            data_extension: data_extension.into(),
        }
    }

    pub fn scan(&self, filenames: &[String], sink: &mut dyn DiagnosticSink) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();

        for name in filenames {
            let Some(extension) = Path::new(name).extension().and_then(|e| e.to_str()) else {
                continue;
            };

            if SPREADSHEET_EXTENSIONS.contains(&extension) {
                outcome.spreadsheets.push(name.clone());
            } else if extension == self.data_extension {
                match parse_data_filename(name, &self.data_extension) {
                    Some(key) => outcome
                        .data_entries
                        .push(ManifestEntry::from_file(key, name.clone())),
                    None => {
                        outcome.had_errors = true;
                        sink.emit(
                            Severity::Error,
                            format!("Filename \"{name}\" not understood"),
                        );
                    }
                }
            } else if extension == "pdf" {
                match parse_document_filename(name) {
                    Some(document) => outcome.documents.push(document),
                    None => {
                        outcome.had_errors = true;
                        sink.emit(
                            Severity::Error,
                            format!("Filename \"{name}\" not understood"),
                        );
                    }
                }
            }
        }

        debug!(
            "Scanned {} names: {} spreadsheets, {} data files, {} documents",
            filenames.len(),
            outcome.spreadsheets.len(),
            outcome.data_entries.len(),
            outcome.documents.len()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemorySink;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_data_filename_accepts_strict_triples() {
        assert_eq!(
            parse_data_filename("12-3-4.hts", "hts"),
            Some(EntryKey::new(12, 3, 4))
        );
    }

    #[test]
    fn parse_data_filename_rejects_everything_else() {
        assert_eq!(parse_data_filename("abc.hts", "hts"), None);
        assert_eq!(parse_data_filename("1-2.hts", "hts"), None);
        assert_eq!(parse_data_filename("1-2-3-extra.hts", "hts"), None);
        assert_eq!(parse_data_filename("x1-2-3.hts", "hts"), None);
        assert_eq!(parse_data_filename("1-2-3.txt", "hts"), None);
    }

    #[test]
    fn parse_data_filename_escapes_the_extension() {
        // The dot in the pattern must not act as a wildcard.
        assert_eq!(parse_data_filename("1-2-3Xhts", "hts"), None);
    }

    #[test]
    fn scan_classifies_spreadsheets_data_and_documents() {
        let scanner = DirectoryScanner::new("hts");
        let mut sink = MemorySink::new();

        let outcome = scanner.scan(
            &names(&[
                "manifest.xls",
                "1-1-1.hts",
                "2-1-1.hts",
                "3-1-1-notes.pdf",
                "40.pdf",
                "README.txt",
            ]),
            &mut sink,
        );

        assert!(!outcome.had_errors);
        assert!(sink.messages.is_empty());
        assert_eq!(outcome.spreadsheets, vec!["manifest.xls"]);
        assert_eq!(outcome.data_entries.len(), 2);
        assert_eq!(outcome.data_entries[0].key, EntryKey::new(1, 1, 1));

        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.documents[0].key, Some(EntryKey::new(3, 1, 1)));
        assert_eq!(outcome.documents[1].station_id, 40);
        assert_eq!(outcome.documents[1].key, None);
    }

    #[test]
    fn malformed_data_filename_is_reported() {
        let scanner = DirectoryScanner::new("hts");
        let mut sink = MemorySink::new();

        let outcome = scanner.scan(&names(&["abc.hts"]), &mut sink);

        assert!(outcome.had_errors);
        assert!(outcome.data_entries.is_empty());
        assert_eq!(sink.errors(), vec!["Filename \"abc.hts\" not understood"]);
    }

    #[test]
    fn malformed_document_filename_is_reported() {
        let scanner = DirectoryScanner::new("hts");
        let mut sink = MemorySink::new();

        let outcome = scanner.scan(&names(&["notes.pdf"]), &mut sink);

        assert!(outcome.had_errors);
        assert!(outcome.documents.is_empty());
        assert_eq!(sink.errors(), vec!["Filename \"notes.pdf\" not understood"]);
    }

    #[test]
    fn unrelated_extensions_are_ignored_silently() {
        let scanner = DirectoryScanner::new("hts");
        let mut sink = MemorySink::new();

        let outcome = scanner.scan(&names(&["data.csv", "no_extension", ".hidden"]), &mut sink);

        assert!(!outcome.had_errors);
        assert!(sink.messages.is_empty());
        assert!(outcome.spreadsheets.is_empty());
        assert!(outcome.data_entries.is_empty());
        assert!(outcome.documents.is_empty());
    }

    #[test]
    fn dir_lister_returns_sorted_file_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.hts"), "x").unwrap();
        std::fs::write(dir.path().join("a.hts"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.hts"), "x").unwrap();

        let listed = DirLister::new(dir.path()).list().unwrap();
        // Subdirectory contents are not listed.
        assert_eq!(listed, vec!["a.hts", "b.hts"]);
    }
}
