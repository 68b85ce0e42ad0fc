//! Canonical records and the typed rows built from them

use std::collections::HashMap;

use chrono::NaiveDate;

use super::{Entity, FieldValue, StoredValue};

/// A fully typed, entity-shaped record produced by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub entity: Entity,
    values: HashMap<&'static str, FieldValue>,
}

impl CanonicalRecord {
    pub(crate) fn new(entity: Entity) -> Self {
        Self {
            entity,
            values: HashMap::new(),
        }
    }

    pub(crate) fn set(&mut self, field: &'static str, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> &str {
        self.get(field).and_then(FieldValue::as_text).unwrap_or("")
    }

    pub fn integer(&self, field: &str) -> i64 {
        self.get(field).and_then(FieldValue::as_integer).unwrap_or(0)
    }

    pub fn decimal(&self, field: &str) -> f64 {
        self.get(field).and_then(FieldValue::as_decimal).unwrap_or(0.0)
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.get(field).and_then(FieldValue::as_date)
    }
}

/// Sales representative ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewRepresentative {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub join_date: NaiveDate,
    pub territory: String,
}

impl NewRepresentative {
    /// Build from a normalized record; `today` fills a missing date
    pub fn from_canonical(record: &CanonicalRecord, today: NaiveDate) -> Self {
        Self {
            name: record.text("name").to_string(),
            email: record.text("email").to_string(),
            phone: record.text("phone").to_string(),
            join_date: record.date("join_date").unwrap_or(today),
            territory: record.text("territory").to_string(),
        }
    }
}

/// Order ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Advisory reference to `sales.id`
    pub sales_id: i64,
    pub customer_name: String,
    pub product: String,
    pub quantity: i64,
    pub order_date: NaiveDate,
    pub amount: f64,
    pub status: String,
}

impl NewOrder {
    pub fn from_canonical(record: &CanonicalRecord, today: NaiveDate) -> Self {
        Self {
            sales_id: record.integer("sales_id"),
            customer_name: record.text("customer_name").to_string(),
            product: record.text("product").to_string(),
            quantity: record.integer("quantity"),
            order_date: record.date("order_date").unwrap_or(today),
            amount: record.decimal("amount"),
            status: record.text("status").to_string(),
        }
    }
}

/// A persisted `sales` row
///
/// Nullable columns stay optional: files created by earlier versions may
/// contain NULLs.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRepresentative {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub join_date: Option<String>,
    pub territory: Option<String>,
}

impl SalesRepresentative {
    /// Stringified values, `id` through `territory`
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt_text(&self.email),
            opt_text(&self.phone),
            opt_text(&self.join_date),
            opt_text(&self.territory),
        ]
    }
}

/// A persisted `orders` row
///
/// Numeric columns keep whatever SQLite stored; see [`StoredValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub sales_id: StoredValue,
    pub customer_name: String,
    pub product: Option<String>,
    pub quantity: StoredValue,
    pub order_date: Option<String>,
    pub amount: StoredValue,
    pub status: Option<String>,
}

impl Order {
    /// Stringified values, `id` through `status`
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.sales_id.to_string(),
            self.customer_name.clone(),
            opt_text(&self.product),
            self.quantity.to_string(),
            opt_text(&self.order_date),
            self.amount.to_string(),
            opt_text(&self.status),
        ]
    }
}

fn opt_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_row_renders_nulls_as_empty() {
        let order = Order {
            id: 4,
            sales_id: StoredValue::Null,
            customer_name: "Toko Maju".to_string(),
            product: Some("Kopi".to_string()),
            quantity: StoredValue::Integer(3),
            order_date: Some("2024-05-01".to_string()),
            amount: StoredValue::Real(45000.0),
            status: None,
        };

        assert_eq!(
            order.to_row(),
            vec!["4", "", "Toko Maju", "Kopi", "3", "2024-05-01", "45000.0", ""]
        );
    }

    #[test]
    fn test_new_order_from_canonical_uses_today_for_missing_date() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut record = CanonicalRecord::new(Entity::Orders);
        record.set("customer_name", FieldValue::Text("Ani".to_string()));
        record.set("quantity", FieldValue::Integer(2));

        let order = NewOrder::from_canonical(&record, today);
        assert_eq!(order.customer_name, "Ani");
        assert_eq!(order.quantity, 2);
        assert_eq!(order.amount, 0.0);
        assert_eq!(order.order_date, today);
    }
}
