//! # Sync Agent
//!
//! Background task that watches the connectivity signal and drains the
//! offline queue on the offline-to-online transition.
//!
//! ## Agent Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Agent Loop                                │
//! │                                                                         │
//! │          ┌───────────────────────────────────────────────┐              │
//! │          │                tokio::select!                 │              │
//! │          │                                               │              │
//! │   watch ─┤  connectivity changed?                        │              │
//! │  channel │    offline → online AND pending > 0           │              │
//! │          │    AND auto-drain enabled                     │              │
//! │          │         │                                     ├── shutdown   │
//! │          │         ▼                                     │   channel    │
//! │          │    drainer.drain()                            │              │
//! │          │    (guard inside makes overlap harmless)      │              │
//! │          └───────────────────────────────────────────────┘              │
//! │                                                                         │
//! │  Only the EDGE triggers a drain. Staying online does nothing; going    │
//! │  offline does nothing; flapping at worst queues one redundant run      │
//! │  that bounces off the drain guard.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::connectivity::ConnectivitySignal;
use crate::drain::Drainer;
use crate::error::{SyncError, SyncResult};
use crate::queue::OfflineQueue;

// =============================================================================
// Sync Agent
// =============================================================================

/// Watches connectivity and triggers drains automatically.
pub struct SyncAgent {
    drainer: Arc<Drainer>,
    queue: Arc<OfflineQueue>,
    connectivity: ConnectivitySignal,
    auto_drain: bool,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl SyncAgent {
    /// Creates an agent. Call [`SyncAgent::start`] to spawn its loop.
    ///
    /// `auto_drain` carries `RemoteSettings::drain_on_reconnect`: when
    /// false the agent keeps watching but never drains on its own, and the
    /// host triggers [`Drainer::drain`] explicitly.
    pub fn new(
        drainer: Arc<Drainer>,
        queue: Arc<OfflineQueue>,
        connectivity: ConnectivitySignal,
        auto_drain: bool,
    ) -> Self {
        SyncAgent {
            drainer,
            queue,
            connectivity,
            auto_drain,
            shutdown_tx: None,
        }
    }

    /// Spawns the background loop.
    ///
    /// If the signal is already online and sales are pending (a previous
    /// run crashed mid-outage), an initial drain runs immediately.
    pub fn start(&mut self) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let drainer = self.drainer.clone();
        let queue = self.queue.clone();
        let rx = self.connectivity.subscribe();

        tokio::spawn(Self::run(drainer, queue, rx, shutdown_rx, self.auto_drain));
        info!(auto_drain = self.auto_drain, "Sync agent started");
    }

    /// Stops the background loop.
    pub async fn shutdown(&mut self) -> SyncResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            tx.send(())
                .await
                .map_err(|_| SyncError::ChannelError("Shutdown channel closed".into()))?;
        }
        Ok(())
    }

    async fn run(
        drainer: Arc<Drainer>,
        queue: Arc<OfflineQueue>,
        mut rx: watch::Receiver<bool>,
        mut shutdown_rx: mpsc::Receiver<()>,
        auto_drain: bool,
    ) {
        let mut was_online = *rx.borrow_and_update();

        // Startup recovery: queued sales from a previous run get drained
        // as soon as the loop starts, without waiting for a transition.
        if auto_drain && was_online && queue.pending_count() > 0 {
            Self::try_drain(&drainer).await;
        }

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        info!("Connectivity signal dropped, sync agent stopping");
                        break;
                    }

                    let online = *rx.borrow_and_update();
                    if auto_drain && online && !was_online && queue.pending_count() > 0 {
                        info!(pending = queue.pending_count(), "Back online, draining queue");
                        Self::try_drain(&drainer).await;
                    }
                    was_online = online;
                }

                _ = shutdown_rx.recv() => {
                    info!("Sync agent shutting down");
                    break;
                }
            }
        }
    }

    async fn try_drain(drainer: &Drainer) {
        if let Err(e) = drainer.drain().await {
            error!(error = %e, "Automatic drain failed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoOpEmitter;
    use crate::store::QueueStore;
    use lumen_core::{Money, PaymentMethod, QueuedItem, SaleDraft};
    use lumen_db::{Database, DbConfig};
    use std::time::Duration;
    use uuid::Uuid;

    fn temp_queue() -> Arc<OfflineQueue> {
        let path = std::env::temp_dir().join(format!("lumen-agent-{}.json", Uuid::new_v4()));
        Arc::new(OfflineQueue::open(QueueStore::new(path)).unwrap())
    }

    fn draft() -> SaleDraft {
        SaleDraft {
            items: vec![QueuedItem {
                product_id: "p-1".into(),
                name: "Rice 5kg".into(),
                quantity: 1,
                unit_price: Money::from_cents(25_000),
                line_total: Money::from_cents(25_000),
                stock_at_add: None,
            }],
            payment_method: PaymentMethod::Cash,
            discount: Money::zero(),
            points_discount: Money::zero(),
            employee_id: None,
            customer_id: None,
        }
    }

    #[tokio::test]
    async fn test_agent_drains_on_reconnect() {
        let queue = temp_queue();
        queue.enqueue(draft()).unwrap();

        let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let drainer = Arc::new(Drainer::new(
            db.clone(),
            queue.clone(),
            Arc::new(NoOpEmitter),
            Duration::from_secs(5),
        ));

        let signal = ConnectivitySignal::new(false);
        let mut agent = SyncAgent::new(drainer, queue.clone(), signal.clone(), true);
        agent.start();

        signal.set_online();

        // Give the spawned loop a moment to observe the edge and drain.
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(queue.pending_count(), 0);
        assert_eq!(db.sales().count().await.unwrap(), 1);

        agent.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_agent_drains_pending_backlog_on_start() {
        let queue = temp_queue();
        queue.enqueue(draft()).unwrap();

        let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let drainer = Arc::new(Drainer::new(
            db.clone(),
            queue.clone(),
            Arc::new(NoOpEmitter),
            Duration::from_secs(5),
        ));

        // Already online at startup: the backlog should not wait for a
        // transition that may never come.
        let signal = ConnectivitySignal::new(true);
        let mut agent = SyncAgent::new(drainer, queue.clone(), signal, true);
        agent.start();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(queue.pending_count(), 0);
        assert_eq!(db.sales().count().await.unwrap(), 1);

        agent.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_auto_drain_can_be_disabled() {
        // Hosts opt out through [remote] drain_on_reconnect in sync.toml
        // and drain manually instead.
        let config: crate::config::SyncConfig =
            toml::from_str("[remote]\ndrain_on_reconnect = false\n").unwrap();
        assert!(!config.remote.drain_on_reconnect);

        let queue = temp_queue();
        queue.enqueue(draft()).unwrap();

        let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let drainer = Arc::new(Drainer::new(
            db.clone(),
            queue.clone(),
            Arc::new(NoOpEmitter),
            Duration::from_secs(5),
        ));

        let signal = ConnectivitySignal::new(false);
        let mut agent = SyncAgent::new(
            drainer,
            queue.clone(),
            signal.clone(),
            config.remote.drain_on_reconnect,
        );
        agent.start();

        signal.set_online();
        tokio::time::sleep(Duration::from_millis(200)).await;

        // The reconnect edge fired but the sale must still be queued.
        assert_eq!(queue.pending_count(), 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);

        agent.shutdown().await.unwrap();
        queue.clear().unwrap();
    }

    #[tokio::test]
    async fn test_going_offline_triggers_nothing() {
        let queue = temp_queue();
        queue.enqueue(draft()).unwrap();

        let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let drainer = Arc::new(Drainer::new(
            db.clone(),
            queue.clone(),
            Arc::new(NoOpEmitter),
            Duration::from_secs(5),
        ));

        let signal = ConnectivitySignal::new(false);
        let mut agent = SyncAgent::new(drainer, queue.clone(), signal.clone(), true);
        agent.start();

        signal.set_offline();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(queue.pending_count(), 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);

        agent.shutdown().await.unwrap();
        queue.clear().unwrap();
    }
}
