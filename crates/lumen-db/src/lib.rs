//! # lumen-db: Remote Persistence Client for Lumen POS
//!
//! This crate provides remote-store access for the offline queue and the
//! credit settlement engine. SQLite (via sqlx) stands in for the hosted
//! backend; the repository seam keeps it an opaque collaborator to every
//! caller.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lumen POS Data Flow                              │
//! │                                                                         │
//! │  lumen-sync (drain / checkout / credit service)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lumen-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  sale/credit/ │    │  (embedded)  │  │   │
//! │  │   │               │    │  audit        │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ transactions  │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (or, in tests, :memory:)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (sale, credit, audit)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lumen_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/store.db")).await?;
//!
//! // Atomic header + items write for a drained queue entry
//! db.sales().insert_from_queued(&queued, Utc::now()).await?;
//!
//! // Ledger insert + balance update, one transaction
//! db.credit().record_payment(&id, amount, PaymentMethod::Cash, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::audit::AuditRepository;
pub use repository::credit::{CreditRepository, MergeOutcome};
pub use repository::sale::SaleRepository;
