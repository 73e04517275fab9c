//! # lumen-sync: Offline Queue Engine for Lumen POS
//!
//! This crate keeps the till selling when the remote store is unreachable:
//! sales are captured into a durable local queue and replayed, in order,
//! once connectivity returns.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Offline Queue Engine                                │
//! │                                                                         │
//! │                       ┌──────────────┐                                  │
//! │   checkout draft ───▶ │   Checkout   │── online ──▶ direct remote write │
//! │                       │ (reads the   │                  (lumen-db)      │
//! │                       │  flag ONCE)  │── offline ─┐                     │
//! │                       └──────────────┘            ▼                     │
//! │                                            ┌──────────────┐             │
//! │   ┌──────────────────┐    persist every    │ OfflineQueue │             │
//! │   │ offline_queue.   │◀───  mutation  ─────│  (FIFO, in   │             │
//! │   │ json (durable)   │───  load on open ──▶│   memory)    │             │
//! │   └──────────────────┘                     └──────┬───────┘             │
//! │                                                   │ snapshot            │
//! │   ┌──────────────────┐   offline→online    ┌──────▼───────┐             │
//! │   │ Connectivity     │──────  edge  ──────▶│   Drainer    │             │
//! │   │ Signal (watch)   │     (SyncAgent)     │ (CAS guard,  │             │
//! │   └──────────────────┘                     │  per-write   │             │
//! │                                            │  timeout)    │             │
//! │                                            └──────┬───────┘             │
//! │                                                   │                     │
//! │                              confirmed write ──▶ remove from queue      │
//! │                              failed/timeout ──▶ entry stays queued      │
//! │                              every attempt  ──▶ sync audit row          │
//! │                                                                         │
//! │  GUARANTEES:                                                           │
//! │  • No loss: an entry leaves the queue only after a confirmed write     │
//! │  • FIFO: drain order is enqueue order, strictly sequential             │
//! │  • Stable identity: remote ID and receipt derive from the original     │
//! │    enqueue time, so retries never renumber a sale                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`agent`] - Background drain-on-reconnect loop
//! - [`checkout`] - Connectivity-aware checkout routing
//! - [`config`] - TOML + environment configuration
//! - [`connectivity`] - Shared online/offline flag
//! - [`drain`] - Queue replay into the remote store
//! - [`error`] - Sync error types
//! - [`notify`] - Event emitter seam for the host shell
//! - [`queue`] - The durable FIFO queue
//! - [`store`] - JSON file persistence for the queue
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lumen_sync::{
//!     Checkout, ConnectivitySignal, Drainer, NoOpEmitter, OfflineQueue,
//!     QueueStore, SyncAgent, SyncConfig,
//! };
//! use lumen_db::{Database, DbConfig};
//!
//! let config = SyncConfig::load_or_default(None);
//! let queue = Arc::new(OfflineQueue::open(QueueStore::new(path))?);
//! let connectivity = ConnectivitySignal::default();
//!
//! let drainer = Arc::new(Drainer::new(
//!     db.clone(), queue.clone(), Arc::new(NoOpEmitter), config.write_timeout(),
//! ));
//! let mut agent = SyncAgent::new(
//!     drainer, queue.clone(), connectivity.clone(), config.remote.drain_on_reconnect,
//! );
//! agent.start();
//!
//! let checkout = Checkout::new(db, queue, connectivity, Arc::new(NoOpEmitter));
//! let outcome = checkout.submit(draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod checkout;
pub mod config;
pub mod connectivity;
pub mod drain;
pub mod error;
pub mod notify;
pub mod queue;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::SyncAgent;
pub use checkout::{Checkout, CheckoutOutcome, CreditCustomer};
pub use config::{QueueSettings, RemoteSettings, SyncConfig};
pub use connectivity::ConnectivitySignal;
pub use drain::{DrainReport, Drainer};
pub use error::{SyncError, SyncResult};
pub use notify::{NoOpEmitter, QueueEventEmitter};
pub use queue::OfflineQueue;
pub use store::QueueStore;
