//! # Checkout Flow
//!
//! Routes each finalized sale to the remote store or the offline queue.
//!
//! ## Routing Decision
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Routing                                  │
//! │                                                                         │
//! │  finalize sale                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  connectivity consulted ONCE ─────────────┐                             │
//! │       │                                   │                             │
//! │    ONLINE                              OFFLINE                          │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  validate draft                      enqueue (never rejects)            │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  direct remote write                 durable queue file                 │
//! │       │                                   │                             │
//! │   fail = HARD ERROR                  notify cashier:                    │
//! │   (no silent fallback                "saved offline, syncs later"       │
//! │    to the queue)                                                        │
//! │                                                                         │
//! │  A mid-checkout connectivity change does NOT re-route the sale. The    │
//! │  flag is read once; whichever path was chosen runs to completion or    │
//! │  fails loudly.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use lumen_core::validation::{validate_item_count, validate_quantity};
use lumen_core::{CreditSale, NewCreditSale, QueuedSale, Sale, SaleDraft};
use lumen_db::Database;

use crate::connectivity::ConnectivitySignal;
use crate::error::{SyncError, SyncResult};
use crate::notify::QueueEventEmitter;
use crate::queue::OfflineQueue;

// =============================================================================
// Checkout Types
// =============================================================================

/// Where a submitted sale ended up.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Confirmed remote write on the direct path.
    Completed(Sale),
    /// Captured locally; the drain will sync it later.
    Queued(QueuedSale),
}

/// Customer details for opening a credit sale at the till.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub due_date: Option<String>,
    pub note: Option<String>,
}

// =============================================================================
// Checkout
// =============================================================================

/// Connectivity-aware checkout entry point.
pub struct Checkout {
    db: Arc<Database>,
    queue: Arc<OfflineQueue>,
    connectivity: ConnectivitySignal,
    emitter: Arc<dyn QueueEventEmitter>,
}

impl Checkout {
    /// Creates the checkout service.
    pub fn new(
        db: Arc<Database>,
        queue: Arc<OfflineQueue>,
        connectivity: ConnectivitySignal,
        emitter: Arc<dyn QueueEventEmitter>,
    ) -> Self {
        Checkout {
            db,
            queue,
            connectivity,
            emitter,
        }
    }

    /// Submits a finalized sale.
    ///
    /// The connectivity flag is read exactly once. On the direct path a
    /// failed remote write surfaces as an error; the sale is never silently
    /// re-routed into the queue, because the cashier believes it completed.
    pub async fn submit(&self, draft: SaleDraft) -> SyncResult<CheckoutOutcome> {
        if self.connectivity.should_use_offline() {
            self.submit_offline(draft).map(CheckoutOutcome::Queued)
        } else {
            self.submit_direct(draft).await.map(CheckoutOutcome::Completed)
        }
    }

    /// Submits a sale and opens a linked credit sale for the unpaid amount.
    ///
    /// Credit lives only in the remote store, so this path refuses to run
    /// offline instead of queueing half a transaction.
    pub async fn submit_on_credit(
        &self,
        draft: SaleDraft,
        customer: CreditCustomer,
    ) -> SyncResult<(Sale, CreditSale)> {
        if self.connectivity.should_use_offline() {
            return Err(SyncError::CreditRequiresRemote);
        }

        let sale = self.submit_direct(draft).await?;

        let credit = self
            .db
            .credit()
            .create(NewCreditSale {
                sale_id: Some(sale.id.clone()),
                customer_name: customer.name,
                customer_phone: customer.phone,
                customer_address: customer.address,
                total: sale.final_amount(),
                due_date: customer.due_date,
                note: customer.note,
            })
            .await?;

        info!(
            sale_id = %sale.id,
            credit_sale_id = %credit.id,
            total = credit.total_cents,
            "Sale completed on credit"
        );

        Ok((sale, credit))
    }

    async fn submit_direct(&self, draft: SaleDraft) -> SyncResult<Sale> {
        // The direct path validates; the offline path does not.
        validate_item_count(draft.items.len())?;
        for item in &draft.items {
            validate_quantity(item.quantity)?;
        }

        let captured = QueuedSale::from_draft(Uuid::new_v4().to_string(), Utc::now(), draft);
        let sale = self.db.sales().insert_direct(&captured, Utc::now()).await?;

        debug!(sale_id = %sale.id, receipt = %sale.receipt_number, "Direct sale completed");
        Ok(sale)
    }

    fn submit_offline(&self, draft: SaleDraft) -> SyncResult<QueuedSale> {
        let queued = self.queue.enqueue(draft)?;
        self.emitter.emit_queued(&queued, self.queue.pending_count());

        info!(
            queued_id = %queued.id,
            pending = self.queue.pending_count(),
            "Sale saved offline, will sync when back online"
        );
        Ok(queued)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoOpEmitter;
    use crate::store::QueueStore;
    use lumen_core::{CreditStatus, Money, PaymentMethod, QueuedItem};
    use lumen_db::DbConfig;

    fn temp_queue() -> Arc<OfflineQueue> {
        let path = std::env::temp_dir().join(format!("lumen-checkout-{}.json", Uuid::new_v4()));
        Arc::new(OfflineQueue::open(QueueStore::new(path)).unwrap())
    }

    async fn checkout_with(online: bool) -> (Checkout, Arc<Database>, Arc<OfflineQueue>) {
        let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let queue = temp_queue();
        let checkout = Checkout::new(
            db.clone(),
            queue.clone(),
            ConnectivitySignal::new(online),
            Arc::new(NoOpEmitter),
        );
        (checkout, db, queue)
    }

    fn draft(cents: i64) -> SaleDraft {
        SaleDraft {
            items: vec![QueuedItem {
                product_id: "p-1".into(),
                name: "Rice 5kg".into(),
                quantity: 1,
                unit_price: Money::from_cents(cents),
                line_total: Money::from_cents(cents),
                stock_at_add: None,
            }],
            payment_method: PaymentMethod::Cash,
            discount: Money::zero(),
            points_discount: Money::zero(),
            employee_id: None,
            customer_id: None,
        }
    }

    #[tokio::test]
    async fn test_online_submit_writes_directly() {
        let (checkout, db, queue) = checkout_with(true).await;

        let outcome = checkout.submit(draft(25_000)).await.unwrap();

        let sale = match outcome {
            CheckoutOutcome::Completed(sale) => sale,
            CheckoutOutcome::Queued(_) => panic!("online sale must not queue"),
        };
        assert_eq!(sale.final_cents, 25_000);
        assert!(sale.receipt_number.contains("-POS-"));
        assert_eq!(queue.pending_count(), 0);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_offline_submit_queues() {
        let (checkout, db, queue) = checkout_with(false).await;

        let outcome = checkout.submit(draft(25_000)).await.unwrap();

        match outcome {
            CheckoutOutcome::Queued(queued) => {
                assert_eq!(queued.final_amount.cents(), 25_000)
            }
            CheckoutOutcome::Completed(_) => panic!("offline sale must queue"),
        }
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);

        queue.clear().unwrap();
    }

    #[tokio::test]
    async fn test_direct_path_validates_empty_cart() {
        let (checkout, _db, _queue) = checkout_with(true).await;

        let mut empty = draft(1_000);
        empty.items.clear();

        let result = checkout.submit(empty).await;
        assert!(matches!(result, Err(SyncError::Validation(_))));
    }

    #[tokio::test]
    async fn test_offline_path_accepts_what_direct_rejects() {
        let (checkout, _db, queue) = checkout_with(false).await;

        let mut empty = draft(1_000);
        empty.items.clear();

        // The fallback path never rejects a sale.
        assert!(checkout.submit(empty).await.is_ok());
        assert_eq!(queue.pending_count(), 1);

        queue.clear().unwrap();
    }

    #[tokio::test]
    async fn test_direct_failure_is_a_hard_error() {
        let (checkout, db, queue) = checkout_with(true).await;

        sqlx::query("DROP TABLE sale_items")
            .execute(db.pool())
            .await
            .unwrap();

        let result = checkout.submit(draft(5_000)).await;

        assert!(matches!(result, Err(SyncError::Database(_))));
        // No silent fallback into the queue.
        assert_eq!(queue.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_credit_checkout_links_sale() {
        let (checkout, db, _queue) = checkout_with(true).await;

        let (sale, credit) = checkout
            .submit_on_credit(
                draft(100_000),
                CreditCustomer {
                    name: "Khamla".into(),
                    phone: None,
                    address: None,
                    due_date: None,
                    note: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(credit.sale_id.as_deref(), Some(sale.id.as_str()));
        assert_eq!(credit.total_cents, sale.final_cents);
        assert_eq!(credit.remaining_cents, sale.final_cents);
        assert_eq!(credit.status, CreditStatus::Pending);

        let stored = db.credit().get_by_id(&credit.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_credit_checkout_refuses_offline() {
        let (checkout, db, queue) = checkout_with(false).await;

        let result = checkout
            .submit_on_credit(
                draft(50_000),
                CreditCustomer {
                    name: "Noy".into(),
                    phone: None,
                    address: None,
                    due_date: None,
                    note: None,
                },
            )
            .await;

        assert!(matches!(result, Err(SyncError::CreditRequiresRemote)));
        assert_eq!(queue.pending_count(), 0);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }
}
