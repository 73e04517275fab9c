//! # Settlement Module
//!
//! Pure settlement logic for the credit engine: status derivation, balance
//! clamping, customer grouping, and the oldest-first merge-payment
//! allocation.
//!
//! ## Merge Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ONE PAYMENT, MANY BILLS (FIFO amortization)                            │
//! │                                                                         │
//! │  Pool: 40,000                                                           │
//! │                                                                         │
//! │  Bills sorted oldest-created-first:                                     │
//! │    B_old (remaining 30,000)  ◄── receives 30,000, fully paid           │
//! │    B_new (remaining 50,000)  ◄── receives 10,000, partial              │
//! │    B_next (remaining 20,000) ◄── untouched, pool exhausted             │
//! │                                                                         │
//! │  The oldest debt is settled before newer debt so long-overdue bills    │
//! │  never linger while fresh ones get paid first.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function. The repository layer applies the
//! resulting plan as sequential ledger writes; it never re-derives the
//! rules locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::CreditStatus;

// =============================================================================
// Status Derivation
// =============================================================================

/// Outstanding balance: `max(0, total - paid)`.
///
/// Clamped at zero even when cumulative payments overshoot the total.
/// Overpayment is accepted and the excess silently absorbed, so the cashier
/// is never blocked at the till.
#[inline]
pub fn remaining(paid: Money, total: Money) -> Money {
    total.saturating_sub(paid)
}

/// Derives the settlement status from the paid/total relationship.
///
/// `status` is a cache, never a source of truth: every write path recomputes
/// it through this function, and a reconciliation job can re-derive it from
/// the ledger alone.
///
/// ```text
/// paid == 0                → Pending
/// 0 < paid, remaining > 0  → Partial
/// remaining == 0           → Paid
/// ```
pub fn derive_status(paid: Money, total: Money) -> CreditStatus {
    if remaining(paid, total).is_zero() {
        CreditStatus::Paid
    } else if paid.is_positive() {
        CreditStatus::Partial
    } else {
        CreditStatus::Pending
    }
}

// =============================================================================
// Customer Grouping
// =============================================================================

/// Normalizes a free-text customer name into the merge-payment grouping key.
///
/// Trimmed and lower-cased. This is the only customer identity the data
/// model offers; two customers with the same name collide and the same
/// customer spelled differently is split. A true customer identifier is the
/// eventual fix; until then every consumer must go through this one
/// function so at least the grouping rule is consistent.
pub fn normalize_customer_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// =============================================================================
// Merge Allocation
// =============================================================================

/// Outstanding balance of one bill, as input to the allocation planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillBalance {
    pub credit_sale_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub remaining: Money,
}

/// One bill's share of a merged payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Allocation {
    pub credit_sale_id: String,
    pub amount: Money,
}

/// The full result of planning a merge payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AllocationPlan {
    /// Per-bill amounts, in application order (oldest bill first).
    pub allocations: Vec<Allocation>,
    /// Pool left over after every eligible bill is settled. Never written
    /// anywhere; reported so the operator sees the excess.
    pub unallocated: Money,
}

/// Plans the distribution of a single payment across multiple bills.
///
/// ## Algorithm
/// Bills are sorted oldest-created-first, then each bill receives
/// `min(pool, bill.remaining)` and the pool decrements by the same; the walk
/// stops once the pool reaches zero. Bills with nothing outstanding and
/// zero-amount allocations are skipped entirely, so every allocation in the
/// plan maps to exactly one positive ledger entry.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use lumen_core::money::Money;
/// use lumen_core::settlement::{plan_allocation, BillBalance};
///
/// let bills = vec![
///     BillBalance {
///         credit_sale_id: "b-new".into(),
///         created_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
///         remaining: Money::from_cents(50_000),
///     },
///     BillBalance {
///         credit_sale_id: "b-old".into(),
///         created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
///         remaining: Money::from_cents(30_000),
///     },
/// ];
///
/// let plan = plan_allocation(bills, Money::from_cents(40_000));
/// assert_eq!(plan.allocations[0].credit_sale_id, "b-old");
/// assert_eq!(plan.allocations[0].amount.cents(), 30_000);
/// assert_eq!(plan.allocations[1].amount.cents(), 10_000);
/// ```
pub fn plan_allocation(mut bills: Vec<BillBalance>, pool: Money) -> AllocationPlan {
    // Oldest debt first. Stable sort keeps enqueue order for equal
    // timestamps.
    bills.sort_by_key(|b| b.created_at);

    let mut remaining_pool = pool;
    let mut allocations = Vec::new();

    for bill in bills {
        if remaining_pool.is_zero() || !remaining_pool.is_positive() {
            break;
        }
        if !bill.remaining.is_positive() {
            continue;
        }

        let amount = remaining_pool.min(bill.remaining);
        remaining_pool -= amount;
        allocations.push(Allocation {
            credit_sale_id: bill.credit_sale_id,
            amount,
        });
    }

    AllocationPlan {
        allocations,
        unallocated: remaining_pool,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
