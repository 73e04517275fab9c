//! # Connectivity Signal
//!
//! Shared online/offline flag with change notification.
//!
//! The flag is fed from outside the engine (browser events, a health-check
//! loop, an operator toggle); this module only distributes it. A tokio
//! watch channel carries the current value plus wakeups on every change,
//! which is exactly the offline-to-online edge the sync agent needs.

use tokio::sync::watch;
use tracing::info;

// =============================================================================
// Connectivity Signal
// =============================================================================

/// Cloneable handle to the shared connectivity flag.
#[derive(Debug, Clone)]
pub struct ConnectivitySignal {
    tx: watch::Sender<bool>,
}

impl ConnectivitySignal {
    /// Creates a signal with the given initial state.
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        ConnectivitySignal { tx }
    }

    /// Current state of the flag.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// True when a new sale must be captured locally instead of written
    /// directly. Checkout consults this exactly once per submission.
    pub fn should_use_offline(&self) -> bool {
        !self.is_online()
    }

    /// Marks the remote store reachable. Wakes subscribers only on an
    /// actual transition.
    pub fn set_online(&self) {
        if !self.tx.send_replace(true) {
            info!("Connectivity restored");
        }
    }

    /// Marks the remote store unreachable.
    pub fn set_offline(&self) {
        if self.tx.send_replace(false) {
            info!("Connectivity lost");
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivitySignal {
    /// Starts offline: the engine assumes nothing about the network until
    /// told otherwise.
    fn default() -> Self {
        Self::new(false)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
