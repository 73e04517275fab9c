//! # Queue Drain
//!
//! Replays queued sales into the remote store, strictly in enqueue order.
//!
//! ## Drain Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Drain Flow                                     │
//! │                                                                         │
//! │  guard: compare_exchange(running, false → true)                         │
//! │     │  (a second drain bounces off and reports already_running)         │
//! │     ▼                                                                   │
//! │  snapshot = queue in FIFO order                                         │
//! │     │                                                                   │
//! │     ▼  for each entry, in order, one at a time:                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  timeout(write_timeout, insert_from_queued(entry))               │  │
//! │  │                                                                  │  │
//! │  │  CONFIRMED ──▶ remove from queue ──▶ audit "synced"              │  │
//! │  │                                                                  │  │
//! │  │  DUPLICATE ──▶ row already exists under the deterministic        │  │
//! │  │                remote ID: an earlier attempt landed, treat       │  │
//! │  │                as confirmed                                      │  │
//! │  │                                                                  │  │
//! │  │  FAILED or ──▶ entry STAYS queued ──▶ audit "failed" + detail    │  │
//! │  │  TIMED OUT     (next drain retries)                              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  release guard, emit DrainReport                                        │
//! │                                                                         │
//! │  NO-LOSS INVARIANT: an entry leaves the queue only after its remote    │
//! │  write is confirmed. A failed or timed-out write keeps it in place,    │
//! │  and the deterministic remote ID makes the eventual retry land on the  │
//! │  same identity.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tracing::{error, info, warn};

use lumen_core::{AuditOutcome, QueuedSale};
use lumen_db::{Database, DbError};

use crate::error::{SyncError, SyncResult};
use crate::notify::QueueEventEmitter;
use crate::queue::OfflineQueue;

// =============================================================================
// Drain Report
// =============================================================================

/// Summary of one drain run.
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    /// Entries the run attempted to write.
    pub attempted: usize,
    /// Entries confirmed and removed from the queue.
    pub synced: usize,
    /// Entries that failed and remain queued.
    pub failed: usize,
    /// True when the run was skipped because another drain held the guard.
    pub already_running: bool,
}

// =============================================================================
// Drainer
// =============================================================================

/// Drains the offline queue into the remote store.
pub struct Drainer {
    db: Arc<Database>,
    queue: Arc<OfflineQueue>,
    emitter: Arc<dyn QueueEventEmitter>,
    write_timeout: Duration,
    running: AtomicBool,
}

impl Drainer {
    /// Creates a drainer with the given per-write timeout.
    pub fn new(
        db: Arc<Database>,
        queue: Arc<OfflineQueue>,
        emitter: Arc<dyn QueueEventEmitter>,
        write_timeout: Duration,
    ) -> Self {
        Drainer {
            db,
            queue,
            emitter,
            write_timeout,
            running: AtomicBool::new(false),
        }
    }

    /// Runs one drain pass over the current queue.
    ///
    /// Re-entrant calls (connectivity flapping, a manual "sync now" during
    /// an automatic run) do not interleave: the guard admits one run at a
    /// time and turns the others into no-ops.
    pub async fn drain(&self) -> SyncResult<DrainReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Drain already in progress, skipping");
            return Ok(DrainReport {
                already_running: true,
                ..DrainReport::default()
            });
        }

        let result = self.drain_locked().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn drain_locked(&self) -> SyncResult<DrainReport> {
        let snapshot = self.queue.snapshot();
        if snapshot.is_empty() {
            return Ok(DrainReport::default());
        }

        info!(pending = snapshot.len(), "Draining offline queue");

        let mut report = DrainReport {
            attempted: snapshot.len(),
            ..DrainReport::default()
        };

        // Strictly sequential: the next entry is not attempted until this
        // one has resolved, preserving FIFO write order at the remote.
        for entry in &snapshot {
            let write = tokio::time::timeout(
                self.write_timeout,
                self.db.sales().insert_from_queued(entry, Utc::now()),
            )
            .await;

            match write {
                Ok(Ok(sale)) => {
                    self.queue.remove(&entry.id)?;
                    report.synced += 1;

                    info!(
                        queued_id = %entry.id,
                        receipt = %sale.receipt_number,
                        "Queued sale synced"
                    );

                    if let Err(e) = self
                        .db
                        .audit()
                        .append(&entry.id, AuditOutcome::Synced, None)
                        .await
                    {
                        // The sale itself is safe; only the trail entry is
                        // missing.
                        error!(queued_id = %entry.id, error = %e, "Failed to append synced audit record");
                    }
                }
                Ok(Err(e)) => {
                    // A unique-key collision where the row exists under the
                    // entry's deterministic remote ID means an earlier
                    // attempt landed without confirmation (a timed-out
                    // write, a crash between write and queue removal).
                    // The entry is synced, not failed.
                    if matches!(e, DbError::UniqueViolation { .. })
                        && self.remote_row_exists(entry).await
                    {
                        self.queue.remove(&entry.id)?;
                        report.synced += 1;

                        info!(
                            queued_id = %entry.id,
                            "Queued sale already present in remote store, marking synced"
                        );

                        if let Err(e) = self
                            .db
                            .audit()
                            .append(
                                &entry.id,
                                AuditOutcome::Synced,
                                Some("confirmed via existing remote row"),
                            )
                            .await
                        {
                            error!(queued_id = %entry.id, error = %e, "Failed to append synced audit record");
                        }
                        continue;
                    }

                    report.failed += 1;
                    let detail = e.to_string();
                    warn!(queued_id = %entry.id, error = %detail, "Remote write failed, sale stays queued");
                    self.emitter.emit_error(&detail, true);

                    self.append_failure_audit(&entry.id, &detail).await;
                }
                Err(_) => {
                    report.failed += 1;
                    // A timeout counts as a failure even though the write
                    // may have landed. If it did, the next drain finds the
                    // row under the stable remote ID and resolves the entry
                    // as synced instead of double-writing it.
                    let err = SyncError::RemoteTimeout(self.write_timeout.as_secs());
                    let detail = err.to_string();
                    warn!(queued_id = %entry.id, "Remote write timed out, sale stays queued");
                    self.emitter.emit_error(&detail, err.is_retryable());

                    self.append_failure_audit(&entry.id, &detail).await;
                }
            }
        }

        info!(
            attempted = report.attempted,
            synced = report.synced,
            failed = report.failed,
            "Drain finished"
        );
        self.emitter.emit_drained(report.synced, report.failed);

        Ok(report)
    }

    /// Checks whether the entry's deterministic remote row is present.
    /// Any read failure counts as absent; the entry then stays queued.
    async fn remote_row_exists(&self, entry: &QueuedSale) -> bool {
        matches!(
            self.db
                .sales()
                .get_by_id(&entry.remote_sale_id().to_string())
                .await,
            Ok(Some(_))
        )
    }

    /// Best-effort failure audit. If the remote store is the thing that is
    /// down, this write fails too; the queue entry itself is the durable
    /// record in that case.
    async fn append_failure_audit(&self, queued_id: &str, detail: &str) {
        if let Err(e) = self
            .db
            .audit()
            .append(queued_id, AuditOutcome::Failed, Some(detail))
            .await
        {
            error!(queued_id = %queued_id, error = %e, "Failed to append failure audit record");
        }
    }

    #[cfg(test)]
    fn hold_guard(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
