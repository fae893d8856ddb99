pub mod csv_export;
pub mod xml_import;

pub use csv_export::{export_progress_csv, export_progress_csv_file};
pub use xml_import::{import_file, import_str, ImportOutcome, ImportWarning, SkipReason};
