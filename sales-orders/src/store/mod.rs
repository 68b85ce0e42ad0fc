//! Schema store: the owned SQLite handle
//!
//! One `Store` is opened at startup and passed by reference to the writer,
//! importer and projection. The pool holds a single connection, so writes
//! are serialized by SQLite itself.

pub mod repository;
pub mod schema;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::StoreError;
use crate::records::{Entity, NewOrder, NewRepresentative, Order, SalesRepresentative};

/// Handle to the sales/orders database
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    location: String,
}

impl Store {
    /// Open (creating if missing) the database file at `path`
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            // sales_id is an advisory reference only
            .foreign_keys(false);

        Self::connect(options, path.display().to_string()).await
    }

    /// Open a private in-memory database
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let target = "sqlite::memory:".to_string();
        let options = target
            .parse::<SqliteConnectOptions>()
            .map_err(|source| StoreError::Connect {
                target: target.clone(),
                source,
            })?
            .foreign_keys(false);

        Self::connect(options, target).await
    }

    async fn connect(options: SqliteConnectOptions, location: String) -> Result<Self, StoreError> {
        // A single long-lived connection; an in-memory database lives and
        // dies with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|source| StoreError::Connect {
                target: location.clone(),
                source,
            })?;

        log::debug!("Opened database {}", location);
        Ok(Self { pool, location })
    }

    /// Where the database lives, for display
    pub fn location(&self) -> &str {
        &self.location
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create both tables if absent
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        schema::ensure_schema(&self.pool).await?;
        log::debug!("Schema ready in {}", self.location);
        Ok(())
    }

    /// Tables present in the database, sorted
    pub async fn table_names(&self) -> Result<Vec<String>, StoreError> {
        schema::table_names(&self.pool).await
    }

    pub async fn insert_representative(&self, rep: &NewRepresentative) -> Result<i64, StoreError> {
        repository::representatives::insert_representative(&self.pool, rep).await
    }

    pub async fn insert_order(&self, order: &NewOrder) -> Result<i64, StoreError> {
        repository::orders::insert_order(&self.pool, order).await
    }

    pub async fn list_representatives(&self) -> Result<Vec<SalesRepresentative>, StoreError> {
        repository::representatives::list_representatives(&self.pool).await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        repository::orders::list_orders(&self.pool).await
    }

    pub async fn representative_exists(&self, id: i64) -> Result<bool, StoreError> {
        repository::representatives::representative_exists(&self.pool, id).await
    }

    pub async fn count(&self, entity: Entity) -> Result<i64, StoreError> {
        repository::count(&self.pool, entity).await
    }

    /// Start a transaction on the store's connection
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
        self.pool
            .begin()
            .await
            .map_err(StoreError::query("start transaction"))
    }

    /// Release the connection; pending statements are already committed
    pub async fn close(self) {
        self.pool.close().await;
        log::debug!("Closed database {}", self.location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::StoredValue;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rep(name: &str) -> NewRepresentative {
        NewRepresentative {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "0812".to_string(),
            join_date: date(2024, 1, 10),
            territory: "North".to_string(),
        }
    }

    async fn store() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_then_list_representative() {
        let store = store().await;

        let id = store.insert_representative(&rep("Rina")).await.unwrap();
        let rows = store.list_representatives().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            SalesRepresentative {
                id,
                name: "Rina".to_string(),
                email: Some("rina@example.com".to_string()),
                phone: Some("0812".to_string()),
                join_date: Some("2024-01-10".to_string()),
                territory: Some("North".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let store = store().await;

        let a = store.insert_representative(&rep("A")).await.unwrap();
        let b = store.insert_representative(&rep("B")).await.unwrap();
        let c = store.insert_representative(&rep("C")).await.unwrap();

        assert!(a < b && b < c);
        let names: Vec<_> = store
            .list_representatives()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_order_with_dangling_reference_is_stored() {
        let store = store().await;

        let order = NewOrder {
            sales_id: 42,
            customer_name: "Toko Baru".to_string(),
            product: "Teh".to_string(),
            quantity: 10,
            order_date: date(2024, 2, 1),
            amount: 125000.0,
            status: "pending".to_string(),
        };
        let id = store.insert_order(&order).await.unwrap();

        assert!(!store.representative_exists(42).await.unwrap());
        let orders = store.list_orders().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, id);
        assert_eq!(orders[0].sales_id, StoredValue::Integer(42));
        assert_eq!(orders[0].amount, StoredValue::Real(125000.0));
        assert_eq!(orders[0].order_date.as_deref(), Some("2024-02-01"));
    }

    #[tokio::test]
    async fn test_ensure_schema_twice_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_orders.db");

        let store = Store::open(&path).await.unwrap();
        store.ensure_schema().await.unwrap();
        store.insert_representative(&rep("Dewi")).await.unwrap();
        store.ensure_schema().await.unwrap();

        assert_eq!(
            store.table_names().await.unwrap(),
            vec!["orders", "sales"]
        );
        assert_eq!(store.count(Entity::Representatives).await.unwrap(), 1);
        store.close().await;

        // Reopen the same file
        let store = Store::open(&path).await.unwrap();
        store.ensure_schema().await.unwrap();
        let rows = store.list_representatives().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Dewi");
    }

    #[tokio::test]
    async fn test_ids_never_reused() {
        let store = store().await;
        store.insert_representative(&rep("A")).await.unwrap();
        let b = store.insert_representative(&rep("B")).await.unwrap();

        // Rows are never deleted by this tool, but a file edited elsewhere may be
        sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(b)
            .execute(store.pool())
            .await
            .unwrap();

        let c = store.insert_representative(&rep("C")).await.unwrap();
        assert!(c > b);
    }

    #[tokio::test]
    async fn test_transaction_rollback_discards_rows() {
        let store = store().await;

        let mut tx = store.begin().await.unwrap();
        repository::representatives::insert_representative(&mut *tx, &rep("B"))
            .await
            .unwrap();
        assert_eq!(repository::count(&mut *tx, Entity::Representatives).await.unwrap(), 1);
        tx.rollback().await.unwrap();

        assert_eq!(store.count(Entity::Representatives).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_legacy_nulls_are_readable() {
        let store = store().await;
        sqlx::query("INSERT INTO orders (customer_name) VALUES ('Legacy')")
            .execute(store.pool())
            .await
            .unwrap();

        let orders = store.list_orders().await.unwrap();
        assert_eq!(orders[0].quantity, StoredValue::Null);
        assert_eq!(orders[0].amount, StoredValue::Null);
        assert_eq!(orders[0].to_row()[6], "");
    }

    #[tokio::test]
    async fn test_legacy_mistyped_numbers_are_readable() {
        let store = store().await;
        sqlx::query(
            "INSERT INTO orders (sales_id, customer_name, quantity, amount) VALUES ('dua', 'Toko A', 'banyak', 'gratis')",
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO orders (sales_id, customer_name, quantity, amount) VALUES (1.5, 'Toko B', 2.5, 1500.5)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let orders = store.list_orders().await.unwrap();
        assert_eq!(orders.len(), 2);

        assert_eq!(orders[0].sales_id, StoredValue::Text("dua".to_string()));
        assert_eq!(orders[0].quantity, StoredValue::Text("banyak".to_string()));
        assert_eq!(orders[0].amount, StoredValue::Text("gratis".to_string()));
        assert_eq!(orders[1].sales_id, StoredValue::Real(1.5));
        assert_eq!(orders[1].quantity, StoredValue::Real(2.5));
        assert_eq!(orders[1].amount, StoredValue::Real(1500.5));

        let row = orders[1].to_row();
        assert_eq!(row[1], "1.5");
        assert_eq!(row[4], "2.5");
        assert_eq!(row[6], "1500.5");
    }
}
