//! # Sale Repository
//!
//! Remote-store operations for confirmed sales and their line items.
//!
//! ## The Dependent Dual Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Draining One Queued Sale                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. INSERT INTO sales (id, receipt_number, ..., created_at)    │   │
//! │  │     ← id and receipt_number derive from the ORIGINAL           │   │
//! │  │       enqueue time, not the drain time                         │   │
//! │  │                                                                 │   │
//! │  │  2. INSERT INTO sale_items (...) for every line item           │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both land or neither does. A header without items            │
//! │           can never exist.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use lumen_core::{QueuedSale, Sale, SaleItem};

/// Repository for sale remote-store operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Writes a queued sale as a confirmed remote transaction.
    ///
    /// Header and line items land in ONE transaction; a failed item write
    /// rolls the header back, so no orphaned header survives a partial
    /// failure.
    ///
    /// ## Identity
    /// The remote ID and receipt number come from
    /// [`QueuedSale::remote_sale_id`] / [`QueuedSale::receipt_number`],
    /// both deterministic on the original enqueue time. `created_at` is the
    /// original transaction time; `synced_at` records when this write
    /// happened.
    pub async fn insert_from_queued(
        &self,
        queued: &QueuedSale,
        synced_at: DateTime<Utc>,
    ) -> DbResult<Sale> {
        self.insert_with_receipt(queued, queued.receipt_number(), synced_at)
            .await
    }

    /// Writes a sale captured on the direct (online) path.
    ///
    /// Same transactional write, "POS" receipt tag instead of "OFF". The
    /// checkout layer builds a [`QueuedSale`] for the shared shape even
    /// though the sale never touched the queue.
    pub async fn insert_direct(
        &self,
        queued: &QueuedSale,
        synced_at: DateTime<Utc>,
    ) -> DbResult<Sale> {
        self.insert_with_receipt(queued, queued.direct_receipt_number(), synced_at)
            .await
    }

    async fn insert_with_receipt(
        &self,
        queued: &QueuedSale,
        receipt_number: String,
        synced_at: DateTime<Utc>,
    ) -> DbResult<Sale> {
        let sale_id = queued.remote_sale_id().to_string();

        debug!(
            queued_id = %queued.id,
            sale_id = %sale_id,
            receipt_number = %receipt_number,
            items = queued.items.len(),
            "Writing queued sale to remote store"
        );

        let sale = Sale {
            id: sale_id,
            receipt_number,
            payment_method: queued.payment_method,
            total_cents: queued.total_amount.cents(),
            discount_cents: queued.discount.cents(),
            points_discount_cents: queued.points_discount.cents(),
            final_cents: queued.final_amount.cents(),
            employee_id: queued.employee_id.clone(),
            customer_id: queued.customer_id.clone(),
            created_at: queued.created_at,
            synced_at,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, receipt_number, payment_method,
                total_cents, discount_cents, points_discount_cents, final_cents,
                employee_id, customer_id, created_at, synced_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.receipt_number)
        .bind(sale.payment_method)
        .bind(sale.total_cents)
        .bind(sale.discount_cents)
        .bind(sale.points_discount_cents)
        .bind(sale.final_cents)
        .bind(&sale.employee_id)
        .bind(&sale.customer_id)
        .bind(sale.created_at)
        .bind(sale.synced_at)
        .execute(&mut *tx)
        .await?;

        for item in &queued.items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, name_snapshot,
                    quantity, unit_price_cents, line_total_cents,
                    stock_at_add, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price.cents())
            .bind(item.line_total.cents())
            .bind(item.stock_at_add)
            .bind(queued.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(sale)
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, payment_method,
                   total_cents, discount_cents, points_discount_cents, final_cents,
                   employee_id, customer_id, created_at, synced_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all line items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, name_snapshot,
                   quantity, unit_price_cents, line_total_cents,
                   stock_at_add, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts confirmed sale headers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lumen_core::{Money, PaymentMethod, QueuedItem, SaleDraft};

    fn queued_sale(id: &str) -> QueuedSale {
        let draft = SaleDraft {
            items: vec![QueuedItem {
                product_id: "p-1".into(),
                name: "Drinking Water 1.5L".into(),
                quantity: 5,
                unit_price: Money::from_cents(5_000),
                line_total: Money::from_cents(25_000),
                stock_at_add: Some(40),
            }],
            payment_method: PaymentMethod::Cash,
            discount: Money::zero(),
            points_discount: Money::zero(),
            employee_id: None,
            customer_id: None,
        };
        QueuedSale::from_draft(id.to_string(), Utc::now(), draft)
    }

    #[tokio::test]
    async fn test_insert_writes_header_and_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let queued = queued_sale("q-1");

        let sale = db
            .sales()
            .insert_from_queued(&queued, Utc::now())
            .await
            .unwrap();

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.final_cents, 25_000);
        assert_eq!(stored.receipt_number, queued.receipt_number());

        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total_cents, 25_000);
    }

    #[tokio::test]
    async fn test_item_failure_rolls_back_header() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Force the item insert to fail after the header insert succeeded.
        sqlx::query("DROP TABLE sale_items")
            .execute(db.pool())
            .await
            .unwrap();

        let queued = queued_sale("q-2");
        let result = db.sales().insert_from_queued(&queued, Utc::now()).await;

        assert!(result.is_err());
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_direct_insert_uses_pos_receipt_tag() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let queued = queued_sale("q-4");

        let sale = db.sales().insert_direct(&queued, Utc::now()).await.unwrap();

        assert!(sale.receipt_number.contains("-POS-"));
        assert_eq!(sale.id, queued.remote_sale_id().to_string());
    }

    #[tokio::test]
    async fn test_duplicate_remote_id_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let queued = queued_sale("q-3");

        db.sales()
            .insert_from_queued(&queued, Utc::now())
            .await
            .unwrap();
        let second = db.sales().insert_from_queued(&queued, Utc::now()).await;

        assert!(matches!(
            second,
            Err(crate::error::DbError::UniqueViolation { .. })
        ));
    }
}
