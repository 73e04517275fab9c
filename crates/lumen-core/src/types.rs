//! # Domain Types
//!
//! Core domain types used throughout Lumen POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  OFFLINE QUEUE                        CREDIT SETTLEMENT                 │
//! │  ┌─────────────────┐                  ┌─────────────────┐               │
//! │  │   QueuedSale    │                  │   CreditSale    │               │
//! │  │  ─────────────  │                  │  ─────────────  │               │
//! │  │  id (local)     │                  │  total (fixed)  │               │
//! │  │  items[]        │                  │  paid (monot.)  │               │
//! │  │  created_at     │                  │  remaining ≥ 0  │               │
//! │  │  final_amount   │                  │  status (cache) │               │
//! │  └────────┬────────┘                  └────────┬────────┘               │
//! │           │ drain                              │ 1:N append-only        │
//! │           ▼                                    ▼                        │
//! │  ┌─────────────────┐                  ┌─────────────────┐               │
//! │  │  Sale + Items   │                  │  CreditPayment  │               │
//! │  │  (remote rows)  │                  │  (ledger row)   │               │
//! │  └─────────────────┘                  └─────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A queued sale has:
//! - `id`: UUID v4 - local queue identity, never sent as the remote key
//! - `remote_sale_id()`: UUID v5 - deterministic remote identity, stable
//!   across repeated drain attempts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::REMOTE_ID_NAMESPACE;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale (or credit payment) was settled.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Bank transfer.
    Transfer,
    /// QR-code wallet payment.
    Qr,
}

// =============================================================================
// Queued Sale (offline queue entry)
// =============================================================================

/// A line item captured at checkout time.
///
/// Uses the snapshot pattern: name, price, and observed stock are frozen at
/// add-time so the queued sale replays faithfully even if the catalog
/// changes before the drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QueuedItem {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Quantity sold. Positive.
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// Line total (unit_price × quantity).
    pub line_total: Money,
    /// Stock level observed at add-time. Informational only, never
    /// authoritative for the remote side.
    pub stock_at_add: Option<i64>,
}

/// Checkout input before it becomes a queued sale or a direct remote write.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    pub items: Vec<QueuedItem>,
    pub payment_method: PaymentMethod,
    pub discount: Money,
    pub points_discount: Money,
    pub employee_id: Option<String>,
    pub customer_id: Option<String>,
}

impl SaleDraft {
    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.line_total)
    }
}

/// A point-of-sale transaction captured locally pending remote confirmation.
///
/// ## Lifecycle
/// Created at checkout time when connectivity is absent; persisted to the
/// local durable store immediately; removed only after a confirmed remote
/// write; never mutated in place except removal.
///
/// ## Invariant
/// `final_amount = total_amount - discount - points_discount`, clamped ≥ 0.
/// Enforced by [`QueuedSale::from_draft`], the only constructor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QueuedSale {
    /// Locally generated unique identifier (not a server ID).
    pub id: String,
    pub items: Vec<QueuedItem>,
    pub payment_method: PaymentMethod,
    pub discount: Money,
    pub points_discount: Money,
    pub employee_id: Option<String>,
    pub customer_id: Option<String>,
    pub total_amount: Money,
    pub final_amount: Money,
    /// Timestamp assigned at the moment of local enqueue. This is the
    /// authoritative transaction time, preserved through sync.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl QueuedSale {
    /// Builds a queued sale from a checkout draft.
    ///
    /// Totals are computed here and the final amount is clamped at zero, so
    /// the enqueue path can never fail for validation reasons (it is the
    /// fallback when the primary path is unavailable).
    pub fn from_draft(id: String, created_at: DateTime<Utc>, draft: SaleDraft) -> Self {
        let total = draft.total();
        let final_amount = total
            .saturating_sub(draft.discount)
            .saturating_sub(draft.points_discount);

        QueuedSale {
            id,
            items: draft.items,
            payment_method: draft.payment_method,
            discount: draft.discount,
            points_discount: draft.points_discount,
            employee_id: draft.employee_id,
            customer_id: draft.customer_id,
            total_amount: total,
            final_amount,
            created_at,
        }
    }

    /// Deterministic remote-stable sale identifier.
    ///
    /// UUID v5 of the local id + enqueue time: re-running a drain after a
    /// partial failure produces the same remote ID for an entry that already
    /// synced in a prior run, so the remote side can deduplicate.
    pub fn remote_sale_id(&self) -> Uuid {
        let seed = format!("{}:{}", self.id, self.created_at.timestamp_millis());
        Uuid::new_v5(&REMOTE_ID_NAMESPACE, seed.as_bytes())
    }

    /// Receipt number derived from the original enqueue time, not from the
    /// drain time.
    ///
    /// ## Format
    /// `YYYYMMDD-OFF-XXXXXXXX` where the suffix is the first 8 hex chars of
    /// the deterministic remote ID. "OFF" marks a sale that went through the
    /// offline queue.
    pub fn receipt_number(&self) -> String {
        self.tagged_receipt("OFF")
    }

    /// Receipt number for a sale written directly, skipping the queue.
    ///
    /// Same deterministic shape, "POS" tag instead of "OFF".
    pub fn direct_receipt_number(&self) -> String {
        self.tagged_receipt("POS")
    }

    fn tagged_receipt(&self, tag: &str) -> String {
        let date_part = self.created_at.format("%Y%m%d");
        let remote = self.remote_sale_id().simple().to_string();
        format!("{}-{}-{}", date_part, tag, &remote[..8])
    }
}

// =============================================================================
// Remote Sale Rows
// =============================================================================

/// A confirmed sale transaction header in the remote store.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub receipt_number: String,
    pub payment_method: PaymentMethod,
    pub total_cents: i64,
    pub discount_cents: i64,
    pub points_discount_cents: i64,
    pub final_cents: i64,
    pub employee_id: Option<String>,
    pub customer_id: Option<String>,
    /// Original transaction time (from local capture).
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// When the remote write was confirmed.
    #[ts(as = "String")]
    pub synced_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the final amount as Money.
    #[inline]
    pub fn final_amount(&self) -> Money {
        Money::from_cents(self.final_cents)
    }
}

/// A line item row keyed to a sale header.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub stock_at_add: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sync Audit
// =============================================================================

/// Outcome of a single drain attempt for one queued sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    /// Remote write confirmed; entry removed from the queue.
    Synced,
    /// Remote write failed; entry stays queued for the next drain.
    Failed,
}

/// Permanent audit record appended remotely for every drain attempt.
///
/// The no-loss property rests on this: a queued sale either remains in the
/// queue or has a `synced` audit row. It never silently disappears.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SyncAuditEntry {
    pub id: String,
    /// The local queue ID of the sale this attempt was for.
    pub queued_sale_id: String,
    pub outcome: AuditOutcome,
    /// Error detail for failed attempts.
    pub detail: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Credit Settlement
// =============================================================================

/// Settlement state of a credit sale.
///
/// This is a **cache**, not a source of truth: it is always recomputed from
/// `paid`/`total` via [`crate::settlement::derive_status`] and any
/// reconciliation job must re-derive it from the payment ledger.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    /// No payment recorded yet.
    Pending,
    /// Some payment recorded, balance outstanding.
    Partial,
    /// Fully settled (remaining = 0).
    Paid,
}

/// A transaction where the customer owes some or all of the amount.
///
/// ## Lifecycle
/// Created once at the point of an unsettled sale; mutated only by recording
/// payments; never deleted by the settlement engine itself.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditSale {
    pub id: String,
    /// Link to a completed sale transaction, if any.
    pub sale_id: Option<String>,
    pub customer_name: String,
    /// Trimmed, lower-cased grouping key for merge payments.
    pub customer_key: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    /// The debt at creation. Fixed once created.
    pub total_cents: i64,
    /// Monotonically non-decreasing, starts at 0.
    pub paid_cents: i64,
    /// Derived: max(0, total - paid).
    pub remaining_cents: i64,
    pub status: CreditStatus,
    pub due_date: Option<String>,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CreditSale {
    /// Returns the outstanding balance as Money.
    #[inline]
    pub fn remaining(&self) -> Money {
        Money::from_cents(self.remaining_cents)
    }

    /// Returns the cumulative paid amount as Money.
    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// Returns the original debt as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Input for opening a new credit sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCreditSale {
    pub sale_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub total: Money,
    pub due_date: Option<String>,
    pub note: Option<String>,
}

/// One row of the append-only payment ledger.
///
/// Immutable once created. Corrections happen by adding offsetting entries,
/// not by editing history.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditPayment {
    pub id: String,
    pub credit_sale_id: String,
    /// Payment amount. Positive.
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CreditPayment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_totals() -> SaleDraft {
        SaleDraft {
            items: vec![
                QueuedItem {
                    product_id: "p-1".into(),
                    name: "Rice 5kg".into(),
                    quantity: 2,
                    unit_price: Money::from_cents(10_000),
                    line_total: Money::from_cents(20_000),
                    stock_at_add: Some(14),
                },
                QueuedItem {
                    product_id: "p-2".into(),
                    name: "Cooking Oil".into(),
                    quantity: 1,
                    unit_price: Money::from_cents(8_000),
                    line_total: Money::from_cents(8_000),
                    stock_at_add: None,
                },
            ],
            payment_method: PaymentMethod::Cash,
            discount: Money::from_cents(2_000),
            points_discount: Money::from_cents(1_000),
            employee_id: Some("emp-7".into()),
            customer_id: None,
        }
    }

    #[test]
    fn test_from_draft_computes_totals() {
        let sale = QueuedSale::from_draft("q-1".into(), Utc::now(), draft_with_totals());

        assert_eq!(sale.total_amount.cents(), 28_000);
        assert_eq!(sale.final_amount.cents(), 25_000);
    }

    #[test]
    fn test_from_draft_clamps_final_amount() {
        let mut draft = draft_with_totals();
        draft.discount = Money::from_cents(50_000);

        let sale = QueuedSale::from_draft("q-2".into(), Utc::now(), draft);
        assert_eq!(sale.final_amount, Money::zero());
    }

    #[test]
    fn test_remote_sale_id_is_deterministic() {
        let created = Utc::now();
        let a = QueuedSale::from_draft("q-3".into(), created, draft_with_totals());
        let b = QueuedSale::from_draft("q-3".into(), created, draft_with_totals());

        assert_eq!(a.remote_sale_id(), b.remote_sale_id());
        assert_eq!(a.receipt_number(), b.receipt_number());
    }

    #[test]
    fn test_remote_sale_id_differs_per_entry() {
        let created = Utc::now();
        let a = QueuedSale::from_draft("q-4".into(), created, draft_with_totals());
        let b = QueuedSale::from_draft("q-5".into(), created, draft_with_totals());

        assert_ne!(a.remote_sale_id(), b.remote_sale_id());
    }

    #[test]
    fn test_receipt_number_marks_origin() {
        let sale = QueuedSale::from_draft("q-6".into(), Utc::now(), draft_with_totals());
        assert!(sale.receipt_number().contains("-OFF-"));
        assert!(sale.direct_receipt_number().contains("-POS-"));
    }
}
