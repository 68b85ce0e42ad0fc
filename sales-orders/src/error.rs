//! Typed errors for the store, normalizer, writer and importer

use std::path::PathBuf;

use thiserror::Error;

/// A required field is missing or a typed field failed coercion during strict entry
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be {expected}, got '{value}'")]
    InvalidValue {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("sales representative {id} does not exist")]
    UnknownRepresentative { id: i64 },
}

impl ValidationError {
    /// Name of the field that failed
    #[cfg(test)]
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::InvalidValue { field, .. } => field,
            ValidationError::UnknownRepresentative { .. } => "sales_id",
        }
    }
}

/// The underlying SQLite store rejected or could not perform a read/write
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database {target}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to {action}")]
    Query {
        action: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub(crate) fn query(action: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| StoreError::Query { action, source }
    }
}

/// The import file could not be opened or parsed as tabular data
#[derive(Debug, Error)]
pub enum ImportSourceError {
    #[error("unsupported import file '{}' (expected .csv, .xlsx, .xlsm, .xls, .xlsb or .ods)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to read CSV file {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} has no sheets", path.display())]
    NoSheets { path: PathBuf },
}

/// Failure of a single strict form submission
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Failure of a bulk import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Source(#[from] ImportSourceError),

    #[error("import from {file} aborted after {persisted} row(s) were saved")]
    Storage {
        file: String,
        persisted: usize,
        #[source]
        source: StoreError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_field() {
        let err = ValidationError::MissingField {
            field: "customer_name",
        };
        assert_eq!(err.field(), "customer_name");
        assert_eq!(err.to_string(), "customer_name is required");

        let err = ValidationError::InvalidValue {
            field: "quantity",
            expected: "an integer",
            value: "lots".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be an integer, got 'lots'");

        let err = ValidationError::UnknownRepresentative { id: 9 };
        assert_eq!(err.field(), "sales_id");
    }
}
