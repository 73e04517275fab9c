//! # lumen-core: Pure Business Logic for Lumen POS
//!
//! This crate is the **heart** of the offline-capable Lumen POS core. It
//! contains all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lumen POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    POS Frontend (external)                      │   │
//! │  │    Checkout UI ──► Credit UI ──► Merge-Pay UI ──► Receipt UI   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lumen-sync (engine layer)                    │   │
//! │  │    offline queue, drain, connectivity, checkout orchestration   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lumen-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ settlement │  │ validation│  │   │
//! │  │   │QueuedSale │  │   Money   │  │  status    │  │   rules   │  │   │
//! │  │   │CreditSale │  │  (cents)  │  │ allocation │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (QueuedSale, CreditSale, CreditPayment, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`settlement`] - Status derivation and merge-payment allocation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lumen_core::money::Money;
//! use lumen_core::settlement::derive_status;
//! use lumen_core::types::CreditStatus;
//!
//! let paid = Money::from_cents(60_000);
//! let total = Money::from_cents(100_000);
//! assert_eq!(derive_status(paid, total), CreditStatus::Partial);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lumen_core::Money` instead of
// `use lumen_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// UUID v5 namespace for deterministic remote sale IDs.
///
/// ## Why a fixed namespace?
/// A queued sale's remote ID must be a pure function of its local identity
/// so that re-running a drain after a partial failure never mints a second,
/// different-looking ID for an entry that already synced.
pub const REMOTE_ID_NAMESPACE: uuid::Uuid = uuid::Uuid::from_bytes([
    0x6c, 0x75, 0x6d, 0x65, 0x6e, 0x2d, 0x70, 0x6f, 0x73, 0x2d, 0x73, 0x79, 0x6e, 0x63, 0x30,
    0x31,
]);

/// Maximum line items allowed on a single queued sale.
///
/// ## Business Reason
/// Prevents runaway carts; keeps a single drain write bounded.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
