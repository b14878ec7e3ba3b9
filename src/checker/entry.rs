use std::cmp::Ordering;
use std::fmt;

/// Composite key identifying one declared time series.
///
/// Ordering is lexicographic over (station_id, variable_id, step_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    pub station_id: u64,
    pub variable_id: u64,
    pub step_id: u64,
}

impl EntryKey {
    pub fn new(station_id: u64, variable_id: u64, step_id: u64) -> Self {
        Self {
            station_id,
            variable_id,
            step_id,
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.station_id, self.variable_id, self.step_id)
    }
}

/// Where a manifest entry came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOrigin {
    /// 1-based row number in the time-series sheet.
    Spreadsheet { row: u32 },
    /// Name of the data file in the working directory.
    File { name: String },
}

/// One (station, variable, timestep) declaration, from either side of the
/// reconciliation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub key: EntryKey,
    pub origin: EntryOrigin,
}

impl ManifestEntry {
    pub fn from_row(key: EntryKey, row: u32) -> Self {
        Self {
            key,
            origin: EntryOrigin::Spreadsheet { row },
        }
    }

    pub fn from_file(key: EntryKey, name: impl Into<String>) -> Self {
        Self {
            key,
            origin: EntryOrigin::File { name: name.into() },
        }
    }
}

/// Comparator for the merge walk.
///
/// `None` stands for an exhausted cursor and sorts after every real key, so
/// the walk drains the remaining side without special-casing exhaustion.
pub fn merge_cmp(a: Option<&EntryKey>, b: Option<&EntryKey>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}
