//! # Credit Repository
//!
//! Remote-store operations for the credit settlement engine: credit sales,
//! the append-only payment ledger, and merge payments.
//!
//! ## The Ledger Dual Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Recording One Payment                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. SELECT paid, total FROM credit_sales WHERE id = ?          │   │
//! │  │                                                                 │   │
//! │  │  2. INSERT INTO credit_payments (amount, method, ...)          │   │
//! │  │                                                                 │   │
//! │  │  3. UPDATE credit_sales SET                                    │   │
//! │  │       paid      = paid + amount,                               │   │
//! │  │       remaining = max(0, total - paid),   ← clamp              │   │
//! │  │       status    = derive_status(paid, total)                   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← The ledger sum and the parent balance can never diverge.     │
//! │                                                                         │
//! │  A merge payment is N of these, applied strictly sequentially in       │
//! │  oldest-bill-first order. Each touched bill gets its own ledger row    │
//! │  so per-bill auditability survives the merge.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use lumen_core::settlement::{
    derive_status, normalize_customer_key, plan_allocation, Allocation, BillBalance,
};
use lumen_core::validation::{validate_new_credit_sale, validate_payment_amount};
use lumen_core::{
    CoreError, CreditPayment, CreditSale, CreditStatus, Money, NewCreditSale, PaymentMethod,
};

// =============================================================================
// Merge Outcome
// =============================================================================

/// Result of applying a merge payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Per-bill payments actually written, in application order.
    pub applied: Vec<Allocation>,
    /// Pool left over after every eligible bill was settled. Reported to
    /// the operator, never written anywhere.
    pub unallocated: Money,
}

// =============================================================================
// Credit Repository
// =============================================================================

/// Repository for credit settlement operations.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    /// Creates a new CreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Opens a new credit sale.
    ///
    /// Starts with `paid = 0`, `remaining = total`, `status = pending`.
    /// The grouping key is normalized here so every later lookup matches.
    pub async fn create(&self, input: NewCreditSale) -> DbResult<CreditSale> {
        validate_new_credit_sale(&input)?;

        let now = Utc::now();
        let sale = CreditSale {
            id: Uuid::new_v4().to_string(),
            sale_id: input.sale_id,
            customer_key: normalize_customer_key(&input.customer_name),
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_address: input.customer_address,
            total_cents: input.total.cents(),
            paid_cents: 0,
            remaining_cents: input.total.cents(),
            status: CreditStatus::Pending,
            due_date: input.due_date,
            note: input.note,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %sale.id, customer = %sale.customer_name, total = sale.total_cents, "Opening credit sale");

        sqlx::query(
            r#"
            INSERT INTO credit_sales (
                id, sale_id, customer_name, customer_key,
                customer_phone, customer_address,
                total_cents, paid_cents, remaining_cents, status,
                due_date, note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_id)
        .bind(&sale.customer_name)
        .bind(&sale.customer_key)
        .bind(&sale.customer_phone)
        .bind(&sale.customer_address)
        .bind(sale.total_cents)
        .bind(sale.paid_cents)
        .bind(sale.remaining_cents)
        .bind(sale.status)
        .bind(&sale.due_date)
        .bind(&sale.note)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a credit sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CreditSale>> {
        let sale = sqlx::query_as::<_, CreditSale>(
            r#"
            SELECT id, sale_id, customer_name, customer_key,
                   customer_phone, customer_address,
                   total_cents, paid_cents, remaining_cents, status,
                   due_date, note, created_at, updated_at
            FROM credit_sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Records a single payment against one credit sale.
    ///
    /// ## Preconditions
    /// `amount > 0`. Overpayment is NOT rejected: the excess is absorbed
    /// and `remaining` clamps at zero.
    ///
    /// ## Atomicity
    /// The ledger insert and the parent balance update share one
    /// transaction; the ledger sum always reconciles with `paid_cents`.
    pub async fn record_payment(
        &self,
        credit_sale_id: &str,
        amount: Money,
        method: PaymentMethod,
        note: Option<&str>,
    ) -> DbResult<CreditPayment> {
        validate_payment_amount(amount)?;

        let mut tx = self.pool.begin().await?;

        let parent = sqlx::query_as::<_, CreditSale>(
            r#"
            SELECT id, sale_id, customer_name, customer_key,
                   customer_phone, customer_address,
                   total_cents, paid_cents, remaining_cents, status,
                   due_date, note, created_at, updated_at
            FROM credit_sales
            WHERE id = ?1
            "#,
        )
        .bind(credit_sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::Core(CoreError::CreditSaleNotFound(credit_sale_id.to_string())))?;

        let payment = CreditPayment {
            id: Uuid::new_v4().to_string(),
            credit_sale_id: credit_sale_id.to_string(),
            amount_cents: amount.cents(),
            method,
            note: note.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO credit_payments (id, credit_sale_id, amount_cents, method, note, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.credit_sale_id)
        .bind(payment.amount_cents)
        .bind(payment.method)
        .bind(&payment.note)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        // Status is recomputed from paid/total on every write, never
        // trusted from storage.
        let paid = parent.paid() + amount;
        let total = parent.total();
        let remaining = total.saturating_sub(paid);
        let status = derive_status(paid, total);

        sqlx::query(
            r#"
            UPDATE credit_sales SET
                paid_cents = ?2,
                remaining_cents = ?3,
                status = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(credit_sale_id)
        .bind(paid.cents())
        .bind(remaining.cents())
        .bind(status)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            credit_sale_id = %credit_sale_id,
            amount = %amount,
            paid = %paid,
            remaining = %remaining,
            status = ?status,
            "Recorded credit payment"
        );

        Ok(payment)
    }

    /// Lists the payment ledger for one credit sale, oldest first.
    pub async fn list_payments(&self, credit_sale_id: &str) -> DbResult<Vec<CreditPayment>> {
        let payments = sqlx::query_as::<_, CreditPayment>(
            r#"
            SELECT id, credit_sale_id, amount_cents, method, note, created_at
            FROM credit_payments
            WHERE credit_sale_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(credit_sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Lists a customer's unpaid and partially-paid bills, oldest first.
    ///
    /// Grouping is by the normalized customer key (trimmed, lower-cased
    /// name). The weakness of name-based identity is documented on
    /// [`normalize_customer_key`].
    pub async fn outstanding_for_customer(
        &self,
        customer_name: &str,
    ) -> DbResult<Vec<CreditSale>> {
        let key = normalize_customer_key(customer_name);

        let bills = sqlx::query_as::<_, CreditSale>(
            r#"
            SELECT id, sale_id, customer_name, customer_key,
                   customer_phone, customer_address,
                   total_cents, paid_cents, remaining_cents, status,
                   due_date, note, created_at, updated_at
            FROM credit_sales
            WHERE customer_key = ?1 AND status != 'paid'
            ORDER BY created_at ASC
            "#,
        )
        .bind(&key)
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }

    /// Allocates one payment pool across a customer's outstanding bills.
    ///
    /// ## Algorithm
    /// Eligible bills (all outstanding bills, or the explicit `selected`
    /// subset) are planned oldest-created-first in lumen-core; each
    /// allocation is then applied as its own [`Self::record_payment`],
    /// strictly sequentially. Every touched bill gets an independent ledger
    /// row, preserving per-bill auditability at the cost of N sequential
    /// writes.
    ///
    /// ## Edge Cases
    /// - Pool exceeding the sum of eligible remainders: the excess is
    ///   returned in [`MergeOutcome::unallocated`], never written.
    /// - No eligible bills: `applied` is empty, the whole pool comes back
    ///   unallocated.
    /// - A selected ID outside the customer's outstanding set is an error.
    pub async fn merge_payment(
        &self,
        customer_name: &str,
        pool: Money,
        method: PaymentMethod,
        note: Option<&str>,
        selected: Option<&[String]>,
    ) -> DbResult<MergeOutcome> {
        validate_payment_amount(pool)?;

        let outstanding = self.outstanding_for_customer(customer_name).await?;

        let eligible: Vec<CreditSale> = match selected {
            Some(ids) => {
                for id in ids {
                    if !outstanding.iter().any(|b| &b.id == id) {
                        return Err(DbError::Core(CoreError::CreditSaleNotFound(id.clone())));
                    }
                }
                outstanding
                    .into_iter()
                    .filter(|b| ids.contains(&b.id))
                    .collect()
            }
            None => outstanding,
        };

        let balances: Vec<BillBalance> = eligible
            .iter()
            .map(|b| BillBalance {
                credit_sale_id: b.id.clone(),
                created_at: b.created_at,
                remaining: b.remaining(),
            })
            .collect();

        let plan = plan_allocation(balances, pool);

        info!(
            customer = %customer_name,
            pool = %pool,
            bills = plan.allocations.len(),
            unallocated = %plan.unallocated,
            "Applying merge payment"
        );

        // Sequential on purpose: two bills of one merge are never paid
        // concurrently, matching the drain's write-ordering rule.
        let mut applied = Vec::with_capacity(plan.allocations.len());
        for allocation in plan.allocations {
            self.record_payment(&allocation.credit_sale_id, allocation.amount, method, note)
                .await?;
            applied.push(allocation);
        }

        Ok(MergeOutcome {
            applied,
            unallocated: plan.unallocated,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_credit(name: &str, total_cents: i64) -> NewCreditSale {
        NewCreditSale {
            sale_id: None,
            customer_name: name.to_string(),
            customer_phone: None,
            customer_address: None,
            total: Money::from_cents(total_cents),
            due_date: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_partial_then_full_payment() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.credit().create(new_credit("Khamla", 100_000)).await.unwrap();

        db.credit()
            .record_payment(&sale.id, Money::from_cents(60_000), PaymentMethod::Cash, None)
            .await
            .unwrap();

        let after_first = db.credit().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(after_first.paid_cents, 60_000);
        assert_eq!(after_first.remaining_cents, 40_000);
        assert_eq!(after_first.status, CreditStatus::Partial);

        db.credit()
            .record_payment(&sale.id, Money::from_cents(40_000), PaymentMethod::Transfer, None)
            .await
            .unwrap();

        let after_second = db.credit().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(after_second.remaining_cents, 0);
        assert_eq!(after_second.status, CreditStatus::Paid);
    }

    #[tokio::test]
    async fn test_overpayment_clamps_remaining() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.credit().create(new_credit("Noy", 50_000)).await.unwrap();

        db.credit()
            .record_payment(&sale.id, Money::from_cents(80_000), PaymentMethod::Cash, None)
            .await
            .unwrap();

        let after = db.credit().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(after.paid_cents, 80_000);
        assert_eq!(after.remaining_cents, 0);
        assert_eq!(after.status, CreditStatus::Paid);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.credit().create(new_credit("Bee", 50_000)).await.unwrap();

        let zero = db
            .credit()
            .record_payment(&sale.id, Money::zero(), PaymentMethod::Cash, None)
            .await;
        assert!(zero.is_err());

        let negative = db
            .credit()
            .record_payment(&sale.id, Money::from_cents(-100), PaymentMethod::Cash, None)
            .await;
        assert!(negative.is_err());

        // Neither attempt may have touched the parent.
        let unchanged = db.credit().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(unchanged.paid_cents, 0);
        assert_eq!(unchanged.status, CreditStatus::Pending);
    }

    #[tokio::test]
    async fn test_payment_against_unknown_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result = db
            .credit()
            .record_payment("missing", Money::from_cents(1_000), PaymentMethod::Cash, None)
            .await;

        assert!(matches!(
            result,
            Err(DbError::Core(CoreError::CreditSaleNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_ledger_reconciles_with_parent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.credit().create(new_credit("Som", 90_000)).await.unwrap();

        for amount in [20_000, 30_000, 15_000] {
            db.credit()
                .record_payment(&sale.id, Money::from_cents(amount), PaymentMethod::Qr, None)
                .await
                .unwrap();
        }

        let parent = db.credit().get_by_id(&sale.id).await.unwrap().unwrap();
        let ledger = db.credit().list_payments(&sale.id).await.unwrap();
        let ledger_sum: i64 = ledger.iter().map(|p| p.amount_cents).sum();

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger_sum, parent.paid_cents);
        assert_eq!(parent.remaining_cents, 25_000);
    }

    #[tokio::test]
    async fn test_merge_payment_oldest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Created first: the older debt.
        let older = db.credit().create(new_credit("Khamla", 30_000)).await.unwrap();
        let newer = db.credit().create(new_credit("Khamla", 50_000)).await.unwrap();

        let outcome = db
            .credit()
            .merge_payment("Khamla", Money::from_cents(40_000), PaymentMethod::Cash, None, None)
            .await
            .unwrap();

        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.applied[0].credit_sale_id, older.id);
        assert_eq!(outcome.applied[0].amount.cents(), 30_000);
        assert_eq!(outcome.applied[1].credit_sale_id, newer.id);
        assert_eq!(outcome.applied[1].amount.cents(), 10_000);
        assert_eq!(outcome.unallocated, Money::zero());

        let older_after = db.credit().get_by_id(&older.id).await.unwrap().unwrap();
        assert_eq!(older_after.status, CreditStatus::Paid);

        let newer_after = db.credit().get_by_id(&newer.id).await.unwrap().unwrap();
        assert_eq!(newer_after.status, CreditStatus::Partial);
        assert_eq!(newer_after.remaining_cents, 40_000);

        // Each touched bill has its own ledger row.
        assert_eq!(db.credit().list_payments(&older.id).await.unwrap().len(), 1);
        assert_eq!(db.credit().list_payments(&newer.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merge_groups_by_normalized_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.credit().create(new_credit("  Khamla ", 10_000)).await.unwrap();
        db.credit().create(new_credit("KHAMLA", 20_000)).await.unwrap();

        let bills = db.credit().outstanding_for_customer("khamla").await.unwrap();
        assert_eq!(bills.len(), 2);
    }

    #[tokio::test]
    async fn test_merge_excess_pool_reported_not_written() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db.credit().create(new_credit("Noy", 10_000)).await.unwrap();

        let outcome = db
            .credit()
            .merge_payment("Noy", Money::from_cents(25_000), PaymentMethod::Cash, None, None)
            .await
            .unwrap();

        assert_eq!(outcome.unallocated.cents(), 15_000);

        // The ledger reflects only what was allocated.
        let ledger = db.credit().list_payments(&sale.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].amount_cents, 10_000);
    }

    #[tokio::test]
    async fn test_merge_with_explicit_subset() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = db.credit().create(new_credit("Som", 10_000)).await.unwrap();
        let second = db.credit().create(new_credit("Som", 20_000)).await.unwrap();

        let outcome = db
            .credit()
            .merge_payment(
                "Som",
                Money::from_cents(30_000),
                PaymentMethod::Transfer,
                None,
                Some(&[second.id.clone()]),
            )
            .await
            .unwrap();

        // Only the selected bill was touched, even though an older one exists.
        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.applied[0].credit_sale_id, second.id);
        assert_eq!(outcome.unallocated.cents(), 10_000);

        let untouched = db.credit().get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(untouched.paid_cents, 0);
    }

    #[tokio::test]
    async fn test_merge_rejects_foreign_selection() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.credit().create(new_credit("Som", 10_000)).await.unwrap();
        let other = db.credit().create(new_credit("Bee", 10_000)).await.unwrap();

        let result = db
            .credit()
            .merge_payment(
                "Som",
                Money::from_cents(5_000),
                PaymentMethod::Cash,
                None,
                Some(&[other.id]),
            )
            .await;

        assert!(matches!(
            result,
            Err(DbError::Core(CoreError::CreditSaleNotFound(_)))
        ));
    }
}
