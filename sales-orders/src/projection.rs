//! Table projection: the full row set of an entity as a string grid

use crate::error::StoreError;
use crate::records::Entity;
use crate::store::Store;

/// Ordered rows of stringified values, `id` first
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub entity_table: &'static str,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Re-read every row of `entity`; never cached
pub async fn project(store: &Store, entity: Entity) -> Result<Grid, StoreError> {
    let rows = match entity {
        Entity::Representatives => store
            .list_representatives()
            .await?
            .iter()
            .map(|r| r.to_row())
            .collect(),
        Entity::Orders => store
            .list_orders()
            .await?
            .iter()
            .map(|o| o.to_row())
            .collect(),
    };

    Ok(Grid {
        entity_table: entity.table(),
        headers: entity.columns(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{FieldNormalizer, RawRecord, RecordWriter, ReferencePolicy};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_projection_reflects_every_write() {
        let store = Store::open_in_memory().await.unwrap();
        store.ensure_schema().await.unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let writer = RecordWriter::new(&store, FieldNormalizer::new(today))
            .with_reference_policy(ReferencePolicy::Accept);

        let grid = project(&store, Entity::Orders).await.unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.headers.len(), 8);

        let form = RawRecord::new()
            .with("sales_id", "3")
            .with("customer_name", "Pak Harun")
            .with("amount", "2500.75");
        let id = writer.add_order(&form).await.unwrap();

        let grid = project(&store, Entity::Orders).await.unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(
            grid.rows[0],
            vec![
                id.to_string(),
                "3".to_string(),
                "Pak Harun".to_string(),
                String::new(),
                "0".to_string(),
                "2024-06-15".to_string(),
                "2500.75".to_string(),
                String::new(),
            ]
        );
    }

    #[tokio::test]
    async fn test_row_width_matches_headers() {
        let store = Store::open_in_memory().await.unwrap();
        store.ensure_schema().await.unwrap();
        let writer = RecordWriter::new(&store, FieldNormalizer::for_today());
        writer
            .add_representative(&RawRecord::new().with("name", "Yusuf"))
            .await
            .unwrap();

        let grid = project(&store, Entity::Representatives).await.unwrap();
        assert_eq!(grid.entity_table, "sales");
        assert_eq!(grid.rows[0].len(), grid.headers.len());
    }

    #[tokio::test]
    async fn test_projection_after_write_tolerates_legacy_rows() {
        let store = Store::open_in_memory().await.unwrap();
        store.ensure_schema().await.unwrap();
        sqlx::query("INSERT INTO orders (customer_name, quantity) VALUES ('Lama', 'banyak')")
            .execute(store.pool())
            .await
            .unwrap();

        let writer = RecordWriter::new(&store, FieldNormalizer::for_today())
            .with_reference_policy(ReferencePolicy::Accept);
        writer
            .add_order(&RawRecord::new().with("customer_name", "Baru").with("quantity", "4"))
            .await
            .unwrap();

        let grid = project(&store, Entity::Orders).await.unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.rows[0][4], "banyak");
        assert_eq!(grid.rows[1][4], "4");
    }
}
