//! # Queue Event Emitter
//!
//! Trait seam for surfacing queue activity to the cashier-facing layer.
//!
//! The engine never formats user-visible text. It reports the facts
//! (queued, drained, failed) and the host decides how to show them: a
//! toast, a badge on the sync icon, a log line in headless runs.

use lumen_core::QueuedSale;

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Trait for emitting queue events (implemented by the host shell).
pub trait QueueEventEmitter: Send + Sync {
    /// A sale was captured offline. `pending` is the queue depth after the
    /// enqueue.
    fn emit_queued(&self, sale: &QueuedSale, pending: usize);

    /// A drain run finished.
    fn emit_drained(&self, synced: usize, failed: usize);

    /// A sync operation failed.
    fn emit_error(&self, message: &str, retryable: bool);
}

/// No-op event emitter for testing and headless runs.
pub struct NoOpEmitter;

impl QueueEventEmitter for NoOpEmitter {
    fn emit_queued(&self, _sale: &QueuedSale, _pending: usize) {}
    fn emit_drained(&self, _synced: usize, _failed: usize) {}
    fn emit_error(&self, _message: &str, _retryable: bool) {}
}
