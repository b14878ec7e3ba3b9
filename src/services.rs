pub mod check_service;
pub mod import_service;

pub use check_service::{CheckError, CheckOutcome, CheckService};
pub use import_service::{ImportError, ImportService, ImportStats};
