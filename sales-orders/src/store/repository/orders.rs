//! Repository for the `orders` table

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

use crate::error::StoreError;
use crate::records::{DATE_FORMAT, NewOrder, Order};

use super::stored_value;

/// Insert one order and return its generated id
///
/// `sales_id` is stored as given; the reference is advisory.
pub async fn insert_order<'e, E>(executor: E, order: &NewOrder) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO orders (sales_id, customer_name, product, quantity, order_date, amount, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(order.sales_id)
    .bind(&order.customer_name)
    .bind(&order.product)
    .bind(order.quantity)
    .bind(order.order_date.format(DATE_FORMAT).to_string())
    .bind(order.amount)
    .bind(&order.status)
    .execute(executor)
    .await
    .map_err(StoreError::query("insert order"))?;

    Ok(result.last_insert_rowid())
}

/// All orders in insertion order
pub async fn list_orders<'e, E>(executor: E) -> Result<Vec<Order>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT id, sales_id, customer_name, product, quantity, order_date, amount, status
        FROM orders
        ORDER BY id
        "#,
    )
    .fetch_all(executor)
    .await
    .map_err(StoreError::query("list orders"))?;

    rows.iter()
        .map(from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::query("read order row"))
}

fn from_row(row: &SqliteRow) -> Result<Order, sqlx::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        sales_id: stored_value(row, "sales_id")?,
        customer_name: row.try_get("customer_name")?,
        product: row.try_get("product")?,
        quantity: stored_value(row, "quantity")?,
        order_date: row.try_get("order_date")?,
        amount: stored_value(row, "amount")?,
        status: row.try_get("status")?,
    })
}
