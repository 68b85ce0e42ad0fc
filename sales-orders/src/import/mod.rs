//! Bulk import of sales representatives and orders from CSV/spreadsheet files

pub mod importer;
pub mod reader;

pub use importer::{BulkImporter, ImportReport};
