//! # Validation Module
//!
//! Input validation utilities for Lumen POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: POS frontend                                                 │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate cashier feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (Rust)                                           │
//! │  └── Settlement rule validation (positive amounts, bounded carts)      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote store (SQLite)                                        │
//! │  ├── CHECK constraints (amount > 0, closed status sets)                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  One deliberate exception: the ENQUEUE path is never validated.        │
//! │  Enqueue is the fallback when the primary path is down, so it must     │
//! │  always succeed locally; totals are clamped instead of rejected.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::NewCreditSale;
use crate::{MAX_ITEM_QUANTITY, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates a credit payment amount.
///
/// ## Rules
/// Zero and negative amounts are rejected. Overpayment is NOT rejected
/// here: excess over the outstanding balance is absorbed by the clamp in
/// the settlement layer.
///
/// ## Example
/// ```rust
/// use lumen_core::money::Money;
/// use lumen_core::validation::validate_payment_amount;
///
/// assert!(validate_payment_amount(Money::from_cents(10_000)).is_ok());
/// assert!(validate_payment_amount(Money::zero()).is_err());
/// assert!(validate_payment_amount(Money::from_cents(-100)).is_err());
/// ```
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a line item quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the item count of a sale draft before the direct path.
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Credit Sale Validators
// =============================================================================

/// Validates input for opening a credit sale.
///
/// ## Rules
/// - Customer name must not be empty (it is the merge-payment grouping key)
/// - Customer name at most 200 characters
/// - The opening debt must be positive
pub fn validate_new_credit_sale(input: &NewCreditSale) -> ValidationResult<()> {
    let name = input.customer_name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: 200,
        });
    }

    if !input.total.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "total".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_credit_sale(name: &str, total_cents: i64) -> NewCreditSale {
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

    #[test]
    fn test_payment_amount_must_be_positive() {
        assert!(validate_payment_amount(Money::from_cents(1)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
        assert!(validate_payment_amount(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_item_count_bounds() {
        assert!(validate_item_count(1).is_ok());
        assert!(validate_item_count(0).is_err());
        assert!(validate_item_count(MAX_SALE_ITEMS + 1).is_err());
    }

    #[test]
    fn test_credit_sale_requires_customer_name() {
        assert!(validate_new_credit_sale(&new_credit_sale("Khamla", 50_000)).is_ok());
        assert!(validate_new_credit_sale(&new_credit_sale("   ", 50_000)).is_err());
        assert!(validate_new_credit_sale(&new_credit_sale("Khamla", 0)).is_err());
    }
}
