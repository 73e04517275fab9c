//! # Repository Module
//!
//! Remote-store repository implementations for Lumen POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts store access behind a clean API.     │
//! │                                                                         │
//! │  Drain engine / credit service                                         │
//! │       │                                                                 │
//! │       │  db.sales().insert_from_queued(&sale, now)                     │
//! │       │  db.credit().record_payment(&id, amount, method, note)         │
//! │       ▼                                                                 │
//! │  Repository (owns the SQL, owns the transactions)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • The dual writes the system depends on (header+items,                │
//! │    ledger+balance) are atomic in exactly one place                      │
//! │  • Callers cannot bypass the settlement rules                          │
//! │  • The hosted backend stays swappable behind this seam                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`sale::SaleRepository`] - Confirmed sale headers and line items
//! - [`credit::CreditRepository`] - Credit sales, ledger, merge payments
//! - [`audit::AuditRepository`] - Append-only sync outcome log

pub mod audit;
pub mod credit;
pub mod sale;
