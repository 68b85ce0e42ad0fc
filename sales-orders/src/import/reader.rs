//! Read import rows from CSV files and spreadsheet workbooks
//!
//! The first row is the header. Each following row becomes a [`RawRecord`]
//! keyed by header; columns with an empty header and rows with no values
//! are dropped.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::ImportSourceError;
use crate::records::{RawRecord, RawValue};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Rows read from one import file
#[derive(Debug, Clone, Default)]
pub struct ImportSource {
    /// Base name of the file, for the import report
    pub file_name: String,
    pub rows: Vec<RawRecord>,
}

/// Supported tabular formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Detect the format from the file extension
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if ext == "csv" {
            Some(SourceFormat::Csv)
        } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceFormat::Workbook)
        } else {
            None
        }
    }
}

/// Read every data row of a CSV or workbook file
pub fn read_rows(path: &Path) -> Result<ImportSource, ImportSourceError> {
    let format = SourceFormat::detect(path).ok_or_else(|| ImportSourceError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let rows = match format {
        SourceFormat::Csv => read_csv(path)?,
        SourceFormat::Workbook => read_workbook(path)?,
    };

    log::debug!("Read {} row(s) from {}", rows.len(), path.display());

    Ok(ImportSource {
        file_name: file_name(path),
        rows,
    })
}

/// Base name of a path, falling back to the full path
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_csv(path: &Path) -> Result<Vec<RawRecord>, ImportSourceError> {
    let csv_err = |source| ImportSourceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;

        let row: RawRecord = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| {
                let value = if cell.is_empty() {
                    RawValue::Empty
                } else {
                    RawValue::Text(cell.to_string())
                };
                (header.as_str(), value)
            })
            .collect();

        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

fn read_workbook(path: &Path) -> Result<Vec<RawRecord>, ImportSourceError> {
    let workbook_err = |source| ImportSourceError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;

    // Only the first sheet is imported
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportSourceError::NoSheets {
            path: path.to_path_buf(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(workbook_err)?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header) => header.iter().map(|c| cell_to_raw(c).to_text()).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let row: RawRecord = headers
            .iter()
            .zip(cells.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.as_str(), cell_to_raw(cell)))
            .collect();

        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Convert a spreadsheet cell to a raw value
fn cell_to_raw(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) if s.trim().is_empty() => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Int(i) => RawValue::Int(*i),
        Data::Float(f) => RawValue::Float(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        // calamine applies the workbook's 1900/1904 epoch
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|value| RawValue::Date(value.date()))
            .unwrap_or(RawValue::Empty),
        Data::DateTimeIso(s) => RawValue::Text(s.clone()),
        Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Error(_) => RawValue::Empty,
    }
}
