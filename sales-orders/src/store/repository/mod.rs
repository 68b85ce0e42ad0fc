//! Repository layer for database operations
//!
//! Functions take any SQLite executor so the same statement runs against
//! the pool (auto-commit) or inside the importer's transaction.

pub mod orders;
pub mod representatives;

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, TypeInfo, ValueRef};

use crate::error::StoreError;
use crate::records::{Entity, StoredValue};

/// Number of rows currently stored for an entity
pub async fn count<'e, E>(executor: E, entity: Entity) -> Result<i64, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT COUNT(*) FROM {}", entity.table());
    let (count,): (i64,) = sqlx::query_as(&sql)
        .fetch_one(executor)
        .await
        .map_err(StoreError::query("count rows"))?;

    Ok(count)
}

/// Decode `column` by the type of the stored value rather than the
/// declared column type
pub(crate) fn stored_value(row: &SqliteRow, column: &str) -> Result<StoredValue, sqlx::Error> {
    let raw = row.try_get_raw(column)?;
    if raw.is_null() {
        return Ok(StoredValue::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" | "BOOLEAN" => StoredValue::Integer(row.try_get_unchecked(column)?),
        "REAL" => StoredValue::Real(row.try_get_unchecked(column)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get_unchecked(column)?;
            StoredValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => StoredValue::Text(row.try_get_unchecked(column)?),
    };
    Ok(value)
}
