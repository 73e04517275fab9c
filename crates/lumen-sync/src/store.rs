//! # Durable Queue Store
//!
//! File-backed persistence for the offline sale queue.
//!
//! ## Storage Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     offline_queue.json                                  │
//! │                                                                         │
//! │  The entire queue is one JSON array, rewritten on every mutation:      │
//! │                                                                         │
//! │  [                                                                      │
//! │    { "id": "…", "items": […], "created_at": "…", … },                  │
//! │    { "id": "…", "items": […], "created_at": "…", … }                   │
//! │  ]                                                                      │
//! │                                                                         │
//! │  Whole-blob rewrite keeps the format trivial to inspect and recover    │
//! │  by hand; queue depth is expected to stay small (an outage's worth     │
//! │  of sales), so rewrite cost is irrelevant.                             │
//! │                                                                         │
//! │  WRITE PROTOCOL: write to <path>.tmp, then rename over <path>.         │
//! │  A crash mid-write must never clobber the existing queue.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use lumen_core::QueuedSale;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Queue Store
// =============================================================================

/// File-backed store for the offline queue blob.
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        QueueStore { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the queue from disk.
    ///
    /// A missing file is an empty queue, not an error: the first run of a
    /// fresh install has nothing queued.
    pub fn load(&self) -> SyncResult<Vec<QueuedSale>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No queue file yet, starting empty");
            return Ok(Vec::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| SyncError::QueueLoadFailed(e.to_string()))?;

        let entries: Vec<QueuedSale> = serde_json::from_str(&contents)
            .map_err(|e| SyncError::QueueLoadFailed(e.to_string()))?;

        debug!(count = entries.len(), path = ?self.path, "Loaded offline queue");
        Ok(entries)
    }

    /// Persists the full queue to disk.
    ///
    /// Writes the blob to a sibling temp file first and renames it into
    /// place, so an interrupted write leaves the previous queue intact.
    pub fn save(&self, entries: &[QueuedSale]) -> SyncResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::QueuePersistFailed(e.to_string()))?;
        }

        let blob = serde_json::to_string_pretty(entries)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, blob)
            .map_err(|e| SyncError::QueuePersistFailed(e.to_string()))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| SyncError::QueuePersistFailed(e.to_string()))?;

        debug!(count = entries.len(), path = ?self.path, "Persisted offline queue");
        Ok(())
    }

    /// Deletes the queue file if it exists.
    pub fn remove_file(&self) -> SyncResult<()> {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(path = ?self.path, error = %e, "Failed to remove queue file");
                return Err(SyncError::QueuePersistFailed(e.to_string()));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lumen_core::{Money, PaymentMethod, QueuedItem, SaleDraft};
    use uuid::Uuid;

    fn temp_store() -> QueueStore {
        let path = std::env::temp_dir().join(format!("lumen-queue-{}.json", Uuid::new_v4()));
        QueueStore::new(path)
    }

    fn queued(id: &str) -> QueuedSale {
        let draft = SaleDraft {
            items: vec![QueuedItem {
                product_id: "p-1".into(),
                name: "Rice 5kg".into(),
                quantity: 1,
                unit_price: Money::from_cents(25_000),
                line_total: Money::from_cents(25_000),
                stock_at_add: Some(3),
            }],
            payment_method: PaymentMethod::Cash,
            discount: Money::zero(),
            points_discount: Money::zero(),
            employee_id: None,
            customer_id: None,
        };
        QueuedSale::from_draft(id.to_string(), Utc::now(), draft)
    }

    #[test]
    fn test_missing_file_is_empty_queue() {
        let store = temp_store();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload_preserves_order() {
        let store = temp_store();

        store.save(&[queued("q-1"), queued("q-2"), queued("q-3")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].id, "q-1");
        assert_eq!(loaded[1].id, "q-2");
        assert_eq!(loaded[2].id, "q-3");

        store.remove_file().unwrap();
    }

    #[test]
    fn test_save_overwrites_previous_blob() {
        let store = temp_store();

        store.save(&[queued("q-1"), queued("q-2")]).unwrap();
        store.save(&[queued("q-2")]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "q-2");

        store.remove_file().unwrap();
    }

    #[test]
    fn test_corrupt_blob_is_load_error() {
        let store = temp_store();
        std::fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.load(), Err(SyncError::QueueLoadFailed(_))));

        store.remove_file().unwrap();
    }

    #[test]
    fn test_amounts_survive_round_trip() {
        let store = temp_store();
        let entry = queued("q-1");

        store.save(std::slice::from_ref(&entry)).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded[0].final_amount, entry.final_amount);
        assert_eq!(loaded[0].created_at, entry.created_at);
        assert_eq!(loaded[0].remote_sale_id(), entry.remote_sale_id());

        store.remove_file().unwrap();
    }
}
