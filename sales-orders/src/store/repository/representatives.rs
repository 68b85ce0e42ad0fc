//! Repository for the `sales` table

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

use crate::error::StoreError;
use crate::records::{DATE_FORMAT, NewRepresentative, SalesRepresentative};

/// Insert one representative and return its generated id
pub async fn insert_representative<'e, E>(
    executor: E,
    rep: &NewRepresentative,
) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO sales (name, email, phone, join_date, territory)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&rep.name)
    .bind(&rep.email)
    .bind(&rep.phone)
    .bind(rep.join_date.format(DATE_FORMAT).to_string())
    .bind(&rep.territory)
    .execute(executor)
    .await
    .map_err(StoreError::query("insert sales representative"))?;

    Ok(result.last_insert_rowid())
}

/// All representatives in insertion order
pub async fn list_representatives<'e, E>(executor: E) -> Result<Vec<SalesRepresentative>, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "SELECT id, name, email, phone, join_date, territory FROM sales ORDER BY id",
    )
    .fetch_all(executor)
    .await
    .map_err(StoreError::query("list sales representatives"))?;

    rows.iter()
        .map(from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::query("read sales representative row"))
}

/// Check if a representative id exists
pub async fn representative_exists<'e, E>(executor: E, id: i64) -> Result<bool, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM sales WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(StoreError::query("look up sales representative"))?;

    Ok(row.is_some())
}

fn from_row(row: &SqliteRow) -> Result<SalesRepresentative, sqlx::Error> {
    Ok(SalesRepresentative {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        join_date: row.try_get("join_date")?,
        territory: row.try_get("territory")?,
    })
}
