//! Per-entity coercion table: canonical field, bilingual alias, kind and default
//!
//! The order of each table is the column order of the SQLite table
//! (excluding `id`) and therefore the column order of the projected grid.

use std::fmt;

use chrono::NaiveDate;

use super::FieldValue;

/// Entities persisted by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Representatives,
    Orders,
}

impl Entity {
    /// SQLite table name (part of the on-disk contract)
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Representatives => "sales",
            Entity::Orders => "orders",
        }
    }

    /// Coercion table for this entity
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Entity::Representatives => REPRESENTATIVE_FIELDS,
            Entity::Orders => ORDER_FIELDS,
        }
    }

    /// The field whose presence gates whether an import row is attempted
    pub fn primary_field(&self) -> &'static str {
        match self {
            Entity::Representatives => "name",
            Entity::Orders => "customer_name",
        }
    }

    /// Column headers of the projected grid, `id` first
    pub fn columns(&self) -> Vec<&'static str> {
        std::iter::once("id")
            .chain(self.fields().iter().map(|f| f.name))
            .collect()
    }

    #[cfg(test)]
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Representatives => write!(f, "sales representative"),
            Entity::Orders => write!(f, "order"),
        }
    }
}

/// Expected type of a canonical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Optional text, defaults to ""
    Text,
    /// Whole number, defaults to 0
    Integer,
    /// Decimal/currency, defaults to 0
    Decimal,
    /// Calendar date, defaults to today
    Date,
}

impl FieldKind {
    /// Human description used in validation messages
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "an integer",
            FieldKind::Decimal => "a number",
            FieldKind::Date => "a date (YYYY-MM-DD)",
        }
    }

    pub fn default_value(&self, today: NaiveDate) -> FieldValue {
        match self {
            FieldKind::Text => FieldValue::Text(String::new()),
            FieldKind::Integer => FieldValue::Integer(0),
            FieldKind::Decimal => FieldValue::Decimal(0.0),
            FieldKind::Date => FieldValue::Date(today),
        }
    }
}

/// One row of the coercion table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical (column) name
    pub name: &'static str,
    /// Alternate header accepted on import and form input
    pub alias: Option<&'static str>,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, alias: Option<&'static str>, kind: FieldKind) -> Self {
        Self { name, alias, kind }
    }

    /// Keys to try, in resolution order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.alias)
    }
}

pub const REPRESENTATIVE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", Some("nama"), FieldKind::Text),
    FieldSpec::new("email", None, FieldKind::Text),
    FieldSpec::new("phone", Some("telepon"), FieldKind::Text),
    FieldSpec::new("join_date", Some("tanggal_bergabung"), FieldKind::Date),
    FieldSpec::new("territory", Some("wilayah"), FieldKind::Text),
];

pub const ORDER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("sales_id", None, FieldKind::Integer),
    FieldSpec::new("customer_name", Some("pelanggan"), FieldKind::Text),
    FieldSpec::new("product", Some("produk"), FieldKind::Text),
    FieldSpec::new("quantity", Some("jumlah"), FieldKind::Integer),
    FieldSpec::new("order_date", Some("tanggal_order"), FieldKind::Date),
    FieldSpec::new("amount", Some("jumlah_rp"), FieldKind::Decimal),
    FieldSpec::new("status", None, FieldKind::Text),
];
