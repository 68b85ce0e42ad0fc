//! Raw input values and typed field values

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;

/// A loosely typed cell or form value, before normalization
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// Missing or blank cell
    #[default]
    Empty,
    /// Text (form input, CSV cell, spreadsheet string cell)
    Text(String),
    /// Whole number cell
    Int(i64),
    /// Floating point cell
    Float(f64),
    /// Boolean cell
    Bool(bool),
    /// Spreadsheet date cell
    Date(NaiveDate),
}

impl RawValue {
    /// Whether the value counts as absent when resolving a field
    ///
    /// Blank text, numeric zero and `false` are all treated like a missing
    /// cell, so resolution falls through to the alias and then the default.
    pub fn is_falsy(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Int(i) => *i == 0,
            RawValue::Float(f) => *f == 0.0 || f.is_nan(),
            RawValue::Bool(b) => !b,
            RawValue::Date(_) => false,
        }
    }

    /// Render the value as text, the way a text field stores it
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Empty => String::new(),
            RawValue::Text(s) => s.trim().to_string(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) => {
                // Spreadsheets store phone numbers and ids as floats
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            RawValue::Bool(b) => b.to_string(),
            RawValue::Date(d) => d.format(super::DATE_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Empty => write!(f, "(empty)"),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<f64> for RawValue {
    fn from(f: f64) -> Self {
        RawValue::Float(f)
    }
}

/// One input record: field name -> raw value
///
/// Keys are trimmed and lower-cased on insert so that `Nama ` in a header
/// row resolves the same as `nama`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    values: HashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a header or form key
    pub fn normalize_key(key: &str) -> String {
        key.trim().to_ascii_lowercase()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<RawValue>) {
        self.values.insert(Self::normalize_key(key), value.into());
    }

    /// Builder-style insert
    #[cfg(test)]
    pub fn with(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(&Self::normalize_key(key))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every cell is absent or falsy
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| matches!(v, RawValue::Empty) || v.to_text().is_empty())
    }
}

impl<K: AsRef<str>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in iter {
            record.insert(key.as_ref(), value);
        }
        record
    }
}

/// A typed, normalized field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            FieldValue::Decimal(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Decimal(d) => write!(f, "{}", format_decimal(*d)),
            FieldValue::Date(d) => write!(f, "{}", d.format(super::DATE_FORMAT)),
        }
    }
}

/// A column value as SQLite stored it, whatever the declared type
///
/// Files written by older tools can hold text or fractional numbers in
/// INTEGER and REAL columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StoredValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Null => Ok(()),
            StoredValue::Integer(i) => write!(f, "{}", i),
            StoredValue::Real(r) => write!(f, "{}", format_decimal(*r)),
            StoredValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Format a REAL column value as a decimal literal (`0.0`, `1500.5`)
pub fn format_decimal(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        assert!(RawValue::Empty.is_falsy());
        assert!(RawValue::from("   ").is_falsy());
        assert!(RawValue::Int(0).is_falsy());
        assert!(RawValue::Float(0.0).is_falsy());
        assert!(RawValue::Float(f64::NAN).is_falsy());
        assert!(RawValue::Bool(false).is_falsy());

        assert!(!RawValue::from("0").is_falsy());
        assert!(!RawValue::Int(3).is_falsy());
        assert!(!RawValue::from("Budi").is_falsy());
    }

    #[test]
    fn test_whole_floats_render_without_fraction() {
        assert_eq!(RawValue::Float(8123456.0).to_text(), "8123456");
        assert_eq!(RawValue::Float(2.5).to_text(), "2.5");
        assert_eq!(RawValue::from("  West ").to_text(), "West");
    }

    #[test]
    fn test_record_keys_are_normalized() {
        let record = RawRecord::new().with(" Nama ", "Budi");
        assert_eq!(record.get("nama"), Some(&RawValue::from("Budi")));
        assert_eq!(record.get("NAMA"), Some(&RawValue::from("Budi")));
        assert_eq!(record.get("name"), None);
    }

    #[test]
    fn test_blank_record() {
        let record: RawRecord = [("name", RawValue::Empty), ("email", RawValue::from(" "))]
            .into_iter()
            .collect();
        assert!(record.is_blank());
        assert!(!RawRecord::new().with("name", "x").is_blank());
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(0.0), "0.0");
        assert_eq!(format_decimal(1500.5), "1500.5");
        assert_eq!(format_decimal(250000.0), "250000.0");
    }
}
