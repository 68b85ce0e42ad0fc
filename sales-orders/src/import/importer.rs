//! Bulk importer: tolerant, row-by-row import inside one transaction
//!
//! Malformed numeric and date fields are replaced by defaults, rows without
//! the entity's primary field are skipped, and the batch commits once at
//! the end. A storage failure stops the batch but keeps the rows already
//! written.

use std::path::Path;

use sqlx::SqliteConnection;

use crate::error::{ImportError, StoreError};
use crate::records::{
    CanonicalRecord, Entity, FieldNormalizer, NewOrder, NewRepresentative, RawRecord,
    ReferencePolicy,
};
use crate::store::Store;
use crate::store::repository::{orders, representatives};

use super::reader;

/// Aggregate outcome of one import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Base name of the imported file
    pub file_name: String,
    pub rows_read: usize,
    pub imported: usize,
    /// Rows without the primary field
    pub skipped: usize,
    /// Malformed values replaced by defaults, across all rows
    pub replaced_fields: usize,
    /// Orders whose sales_id matches no representative
    pub dangling_references: usize,
    /// Ids of the inserted rows, in file order
    pub ids: Vec<i64>,
}

impl ImportReport {
    fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            ..Default::default()
        }
    }
}

pub struct BulkImporter<'a> {
    store: &'a Store,
    normalizer: FieldNormalizer,
    reference_policy: ReferencePolicy,
}

impl<'a> BulkImporter<'a> {
    pub fn new(store: &'a Store, normalizer: FieldNormalizer) -> Self {
        Self {
            store,
            normalizer,
            reference_policy: ReferencePolicy::default(),
        }
    }

    /// Dangling references are counted and logged unless the policy is
    /// `accept`; an import never rejects a row for them.
    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }

    /// Read `path` and import its rows
    ///
    /// The file is fully read before any row is written, so an unreadable
    /// file leaves the store untouched.
    pub async fn import_file(&self, entity: Entity, path: &Path) -> Result<ImportReport, ImportError> {
        let source = reader::read_rows(path)?;
        log::info!(
            "Importing {} row(s) of {} data from {}",
            source.rows.len(),
            entity,
            source.file_name
        );
        self.import_rows(entity, &source.file_name, source.rows).await
    }

    /// Import already-read rows
    pub async fn import_rows<I>(
        &self,
        entity: Entity,
        file_name: &str,
        rows: I,
    ) -> Result<ImportReport, ImportError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut report = ImportReport::new(file_name);
        let storage_err = |persisted, source| ImportError::Storage {
            file: file_name.to_string(),
            persisted,
            source,
        };

        let mut tx = self.store.begin().await.map_err(|e| storage_err(0, e))?;

        for (index, row) in rows.into_iter().enumerate() {
            report.rows_read += 1;
            // Header is line 1
            let line = index + 2;

            let normalized = self.normalizer.normalize_lenient(entity, &row);
            if normalized.record.text(entity.primary_field()).is_empty() {
                log::debug!(
                    "{} line {}: no {}, skipped",
                    file_name,
                    line,
                    entity.primary_field()
                );
                report.skipped += 1;
                continue;
            }

            if !normalized.replaced.is_empty() {
                log::info!(
                    "{} line {}: replaced {} with defaults",
                    file_name,
                    line,
                    normalized.replaced.join(", ")
                );
                report.replaced_fields += normalized.replaced.len();
            }

            match self.write_row(&mut tx, &normalized.record, &mut report).await {
                Ok(id) => {
                    report.imported += 1;
                    report.ids.push(id);
                }
                Err(source) => {
                    log::error!("{} line {}: {}", file_name, line, source);
                    // No compensating rollback: rows already written stay
                    tx.commit()
                        .await
                        .map_err(|e| storage_err(0, StoreError::query("commit import")(e)))?;
                    return Err(storage_err(report.imported, source));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| storage_err(0, StoreError::query("commit import")(e)))?;

        log::info!(
            "Imported {} of {} row(s) from {} ({} skipped)",
            report.imported,
            report.rows_read,
            report.file_name,
            report.skipped
        );
        Ok(report)
    }

    async fn write_row(
        &self,
        conn: &mut SqliteConnection,
        record: &CanonicalRecord,
        report: &mut ImportReport,
    ) -> Result<i64, StoreError> {
        let today = self.normalizer.today();
        match record.entity {
            Entity::Representatives => {
                let rep = NewRepresentative::from_canonical(record, today);
                representatives::insert_representative(&mut *conn, &rep).await
            }
            Entity::Orders => {
                let order = NewOrder::from_canonical(record, today);
                if self.reference_policy != ReferencePolicy::Accept
                    && !representatives::representative_exists(&mut *conn, order.sales_id).await?
                {
                    log::warn!(
                        "Order for {} references sales representative {} which does not exist",
                        order.customer_name,
                        order.sales_id
                    );
                    report.dangling_references += 1;
                }
                orders::insert_order(&mut *conn, &order).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RawValue;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    async fn store() -> Store {
        let store = Store::open_in_memory().await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    fn order_row(customer: &str) -> RawRecord {
        RawRecord::new()
            .with("customer_name", customer)
            .with("product", "Kopi")
            .with("quantity", "2")
    }

    #[tokio::test]
    async fn test_skips_rows_without_customer() {
        let store = store().await;
        let importer = BulkImporter::new(&store, FieldNormalizer::new(today()));

        let rows = vec![order_row("Ani"), order_row(""), order_row("Budi")];
        let report = importer
            .import_rows(Entity::Orders, "orders.csv", rows)
            .await
            .unwrap();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.file_name, "orders.csv");
        assert_eq!(store.count(Entity::Orders).await.unwrap(), 2);

        let names: Vec<_> = store
            .list_orders()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.customer_name)
            .collect();
        assert_eq!(names, vec!["Ani", "Budi"]);
    }

    #[tokio::test]
    async fn test_malformed_fields_become_defaults() {
        let store = store().await;
        let importer = BulkImporter::new(&store, FieldNormalizer::new(today()))
            .with_reference_policy(ReferencePolicy::Accept);

        let row = RawRecord::new()
            .with("pelanggan", "Toko Rejeki")
            .with("sales_id", "abc")
            .with("jumlah", "banyak")
            .with("jumlah_rp", RawValue::Float(99500.0))
            .with("tanggal_order", "31/12/2023");

        let report = importer
            .import_rows(Entity::Orders, "orders.xlsx", vec![row])
            .await
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.replaced_fields, 2);

        let order = &store.list_orders().await.unwrap()[0];
        assert_eq!(order.sales_id, Some(0));
        assert_eq!(order.quantity, Some(0));
        assert_eq!(order.amount, Some(99500.0));
        assert_eq!(order.order_date.as_deref(), Some("2023-12-31"));
    }

    #[tokio::test]
    async fn test_representatives_with_aliases() {
        let store = store().await;
        let importer = BulkImporter::new(&store, FieldNormalizer::new(today()));

        let rows = vec![
            RawRecord::new().with("nama", "Budi").with("wilayah", "Timur"),
            RawRecord::new().with("email", "orphan@example.com"),
            RawRecord::new()
                .with("name", "Citra")
                .with("tanggal_bergabung", "2022-08-01"),
        ];
        let report = importer
            .import_rows(Entity::Representatives, "sales.csv", rows)
            .await
            .unwrap();
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);

        let reps = store.list_representatives().await.unwrap();
        assert_eq!(reps[0].to_row()[1..], ["Budi", "", "", "2024-06-15", "Timur"]);
        assert_eq!(reps[1].join_date.as_deref(), Some("2022-08-01"));
    }

    #[tokio::test]
    async fn test_dangling_references_counted_not_rejected() {
        let store = store().await;
        let importer = BulkImporter::new(&store, FieldNormalizer::new(today()))
            .with_reference_policy(ReferencePolicy::Reject);

        let rows = vec![order_row("Ani").with("sales_id", "7")];
        let report = importer
            .import_rows(Entity::Orders, "orders.csv", rows)
            .await
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.dangling_references, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_earlier_rows() {
        let store = store().await;
        sqlx::query(
            "CREATE TRIGGER refuse_boom BEFORE INSERT ON orders
             WHEN NEW.customer_name = 'BOOM'
             BEGIN SELECT RAISE(ABORT, 'refused'); END",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let importer = BulkImporter::new(&store, FieldNormalizer::new(today()));
        let rows = vec![order_row("Ani"), order_row("BOOM"), order_row("Budi")];
        let err = importer
            .import_rows(Entity::Orders, "orders.csv", rows)
            .await
            .unwrap_err();

        match err {
            ImportError::Storage { file, persisted, .. } => {
                assert_eq!(file, "orders.csv");
                assert_eq!(persisted, 1);
            }
            other => panic!("expected storage error, got {other:?}"),
        }
        assert_eq!(store.count(Entity::Orders).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repeat_orders.csv");
        std::fs::write(
            &path,
            "sales_id,pelanggan,produk,jumlah,tanggal_order,jumlah_rp,status\n\
             1,Toko Maju,Kopi,3,2024-05-01,45000,lunas\n\
             1,,Teh,1,2024-05-02,10000,\n\
             2,Warung Sari,Gula,,,,\n",
        )
        .unwrap();

        let store = store().await;
        let importer = BulkImporter::new(&store, FieldNormalizer::new(today()))
            .with_reference_policy(ReferencePolicy::Accept);
        let report = importer.import_file(Entity::Orders, &path).await.unwrap();

        assert_eq!(report.file_name, "repeat_orders.csv");
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);

        let rows: Vec<_> = store
            .list_orders()
            .await
            .unwrap()
            .iter()
            .map(|o| o.to_row())
            .collect();
        assert_eq!(
            rows[0][1..],
            ["1", "Toko Maju", "Kopi", "3", "2024-05-01", "45000.0", "lunas"]
        );
        assert_eq!(
            rows[1][1..],
            ["2", "Warung Sari", "Gula", "0", "2024-06-15", "0.0", ""]
        );
    }

    #[tokio::test]
    async fn test_unreadable_file_writes_nothing() {
        let store = store().await;
        let importer = BulkImporter::new(&store, FieldNormalizer::new(today()));

        let err = importer
            .import_file(Entity::Orders, Path::new("does-not-exist.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Source(_)));
        assert_eq!(store.count(Entity::Orders).await.unwrap(), 0);
    }
}
