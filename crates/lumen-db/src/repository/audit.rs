//! # Sync Audit Repository
//!
//! Append-only outcome log for drain attempts.
//!
//! Every drain attempt for a queued sale lands here as `synced` or `failed`.
//! Together with the local queue this carries the no-loss guarantee: an
//! entry either stays queued or has a `synced` audit row. Failed entries are
//! NOT discarded from the queue; the failure row exists for the operator,
//! not as a tombstone.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use lumen_core::{AuditOutcome, SyncAuditEntry};

/// Repository for sync audit operations.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends an audit record for one drain attempt.
    ///
    /// ## Arguments
    /// * `queued_sale_id` - The LOCAL queue ID (not the remote sale ID)
    /// * `outcome` - `Synced` or `Failed`
    /// * `detail` - Error detail for failures, `None` for successes
    pub async fn append(
        &self,
        queued_sale_id: &str,
        outcome: AuditOutcome,
        detail: Option<&str>,
    ) -> DbResult<SyncAuditEntry> {
        let entry = SyncAuditEntry {
            id: Uuid::new_v4().to_string(),
            queued_sale_id: queued_sale_id.to_string(),
            outcome,
            detail: detail.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(
            queued_sale_id = %entry.queued_sale_id,
            outcome = ?entry.outcome,
            "Appending sync audit record"
        );

        sqlx::query(
            r#"
            INSERT INTO sync_audit (id, queued_sale_id, outcome, detail, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.queued_sale_id)
        .bind(entry.outcome)
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Lists audit records for one queued sale, oldest first.
    pub async fn list_for_queued_sale(
        &self,
        queued_sale_id: &str,
    ) -> DbResult<Vec<SyncAuditEntry>> {
        let entries = sqlx::query_as::<_, SyncAuditEntry>(
            r#"
            SELECT id, queued_sale_id, outcome, detail, created_at
            FROM sync_audit
            WHERE queued_sale_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(queued_sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Counts audit records with the given outcome.
    pub async fn count_outcome(&self, outcome: AuditOutcome) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sync_audit WHERE outcome = ?1")
                .bind(outcome)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
