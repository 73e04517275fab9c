//! # Offline Queue
//!
//! The in-process view of the durable sale queue.
//!
//! ## Queue Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Offline Queue Lifecycle                            │
//! │                                                                         │
//! │   checkout (offline)                                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────┐   persist every mutation   ┌──────────────────────┐      │
//! │   │ enqueue ├───────────────────────────▶│  offline_queue.json  │      │
//! │   └────┬────┘                            └──────────┬───────────┘      │
//! │        │                                            │ app restart      │
//! │        ▼                                            ▼                  │
//! │   [ q-1, q-2, q-3 ]  ◀──────────────────────── load on open            │
//! │        │                                                                │
//! │        │  drain: remove(q-1) only AFTER the remote write is confirmed  │
//! │        ▼                                                                │
//! │   [ q-2, q-3 ]                                                          │
//! │                                                                         │
//! │   RULES:                                                               │
//! │   • Enqueue NEVER fails on business grounds. It is the fallback path;  │
//! │     totals are clamped, not rejected.                                  │
//! │   • FIFO order is the drain order. No reordering, ever.                │
//! │   • An entry leaves the queue only via confirmed sync or explicit      │
//! │     operator clear.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use lumen_core::{QueuedSale, SaleDraft};

use crate::error::SyncResult;
use crate::store::QueueStore;

// =============================================================================
// Offline Queue
// =============================================================================

/// Ordered, durable queue of sales awaiting a remote write.
///
/// Every mutation persists the full queue through the backing
/// [`QueueStore`] before returning, so a crash immediately after enqueue
/// still finds the sale on disk.
#[derive(Debug)]
pub struct OfflineQueue {
    store: QueueStore,
    entries: Mutex<Vec<QueuedSale>>,
}

impl OfflineQueue {
    /// Opens the queue, loading any entries persisted by a previous run.
    pub fn open(store: QueueStore) -> SyncResult<Self> {
        let entries = store.load()?;

        if !entries.is_empty() {
            info!(count = entries.len(), "Recovered offline queue from disk");
        }

        Ok(OfflineQueue {
            store,
            entries: Mutex::new(entries),
        })
    }

    fn entries(&self) -> MutexGuard<'_, Vec<QueuedSale>> {
        // A poisoned lock still holds a consistent queue; the panic that
        // poisoned it happened in another task after its own mutation
        // completed and persisted.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Captures a checkout draft into the queue and persists it.
    ///
    /// Assigns the local ID and the authoritative transaction timestamp.
    /// No business validation happens here: this is the fallback path when
    /// the remote store is unreachable, and it must always accept the sale.
    pub fn enqueue(&self, draft: SaleDraft) -> SyncResult<QueuedSale> {
        let sale = QueuedSale::from_draft(Uuid::new_v4().to_string(), Utc::now(), draft);

        let mut entries = self.entries();
        entries.push(sale.clone());
        self.store.save(&entries)?;

        debug!(id = %sale.id, pending = entries.len(), "Queued sale for later sync");
        Ok(sale)
    }

    /// Number of sales awaiting sync.
    pub fn pending_count(&self) -> usize {
        self.entries().len()
    }

    /// Returns a copy of the queue in drain order.
    pub fn snapshot(&self) -> Vec<QueuedSale> {
        self.entries().clone()
    }

    /// Removes one entry by local ID and persists the shrunken queue.
    ///
    /// Called by the drain only after the remote write is confirmed.
    /// Returns false if no entry with that ID was queued.
    pub fn remove(&self, id: &str) -> SyncResult<bool> {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == before {
            return Ok(false);
        }

        self.store.save(&entries)?;
        debug!(id = %id, pending = entries.len(), "Removed synced sale from queue");
        Ok(true)
    }

    /// Discards everything in the queue. Returns the number of entries
    /// dropped.
    ///
    /// Queued sales are unconfirmed transactions; this is an explicit
    /// operator action, never something the engine does on its own.
    pub fn clear(&self) -> SyncResult<usize> {
        let mut entries = self.entries();
        let dropped = entries.len();
        entries.clear();
        self.store.save(&entries)?;

        if dropped > 0 {
            info!(dropped, "Offline queue cleared");
        }
        Ok(dropped)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Money, PaymentMethod, QueuedItem};

    fn temp_store() -> QueueStore {
        let path = std::env::temp_dir().join(format!("lumen-queue-{}.json", Uuid::new_v4()));
        QueueStore::new(path)
    }

    fn draft(product: &str, cents: i64) -> SaleDraft {
        SaleDraft {
            items: vec![QueuedItem {
                product_id: product.to_string(),
                name: product.to_string(),
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

    #[test]
    fn test_enqueue_assigns_identity_and_totals() {
        let queue = OfflineQueue::open(temp_store()).unwrap();

        let sale = queue.enqueue(draft("p-1", 25_000)).unwrap();

        assert!(!sale.id.is_empty());
        assert_eq!(sale.final_amount.cents(), 25_000);
        assert_eq!(queue.pending_count(), 1);

        queue.clear().unwrap();
    }

    #[test]
    fn test_queue_survives_reopen() {
        let store = temp_store();

        {
            let queue = OfflineQueue::open(store.clone()).unwrap();
            queue.enqueue(draft("p-1", 10_000)).unwrap();
            queue.enqueue(draft("p-2", 20_000)).unwrap();
        }

        // Simulated app restart: a fresh queue over the same file.
        let reopened = OfflineQueue::open(store.clone()).unwrap();
        assert_eq!(reopened.pending_count(), 2);

        store.remove_file().unwrap();
    }

    #[test]
    fn test_snapshot_preserves_enqueue_order() {
        let queue = OfflineQueue::open(temp_store()).unwrap();

        let first = queue.enqueue(draft("p-1", 1_000)).unwrap();
        let second = queue.enqueue(draft("p-2", 2_000)).unwrap();
        let third = queue.enqueue(draft("p-3", 3_000)).unwrap();

        let snapshot = queue.snapshot();
        assert_eq!(snapshot[0].id, first.id);
        assert_eq!(snapshot[1].id, second.id);
        assert_eq!(snapshot[2].id, third.id);

        queue.clear().unwrap();
    }

    #[test]
    fn test_remove_only_targets_one_entry() {
        let queue = OfflineQueue::open(temp_store()).unwrap();

        let keep = queue.enqueue(draft("p-1", 1_000)).unwrap();
        let gone = queue.enqueue(draft("p-2", 2_000)).unwrap();

        assert!(queue.remove(&gone.id).unwrap());
        assert!(!queue.remove(&gone.id).unwrap());

        let snapshot = queue.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, keep.id);

        queue.clear().unwrap();
    }

    #[test]
    fn test_clear_reports_dropped_count() {
        let queue = OfflineQueue::open(temp_store()).unwrap();

        queue.enqueue(draft("p-1", 1_000)).unwrap();
        queue.enqueue(draft("p-2", 2_000)).unwrap();

        assert_eq!(queue.clear().unwrap(), 2);
        assert_eq!(queue.pending_count(), 0);
        assert_eq!(queue.clear().unwrap(), 0);
    }

    #[test]
    fn test_enqueue_accepts_empty_cart() {
        // The fallback path never rejects: a degenerate draft still queues.
        let queue = OfflineQueue::open(temp_store()).unwrap();

        let sale = queue
            .enqueue(SaleDraft {
                items: vec![],
                payment_method: PaymentMethod::Qr,
                discount: Money::zero(),
                points_discount: Money::zero(),
                employee_id: None,
                customer_id: None,
            })
            .unwrap();

        assert_eq!(sale.final_amount, Money::zero());
        queue.clear().unwrap();
    }
}
