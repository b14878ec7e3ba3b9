// Consistency checker: manifest entries and the merge-compare reconciler.

pub mod entry;
pub mod reconciler;

pub use entry::{merge_cmp, EntryKey, EntryOrigin, ManifestEntry};
pub use reconciler::{ManifestReconciler, ReconciliationError};
