//! Table definitions
//!
//! Table and column names are the on-disk contract: the statements only
//! create what is missing, so they must match files written by earlier
//! versions.

use sqlx::SqlitePool;

use crate::error::StoreError;

const CREATE_SALES: &str = r#"
    CREATE TABLE IF NOT EXISTS sales (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        join_date TEXT,
        territory TEXT
    )
"#;

const CREATE_ORDERS: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        sales_id INTEGER,
        customer_name TEXT NOT NULL,
        product TEXT,
        quantity INTEGER,
        order_date TEXT,
        amount REAL,
        status TEXT,
        FOREIGN KEY (sales_id) REFERENCES sales (id)
    )
"#;

/// Create both tables if absent; safe to call on every startup
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(CREATE_SALES)
        .execute(pool)
        .await
        .map_err(StoreError::query("create sales table"))?;

    sqlx::query(CREATE_ORDERS)
        .execute(pool)
        .await
        .map_err(StoreError::query("create orders table"))?;

    Ok(())
}

/// Names of the user tables currently present
pub async fn table_names(pool: &SqlitePool) -> Result<Vec<String>, StoreError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .map_err(StoreError::query("list tables"))?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}
