//! Background eviction of expired window entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::clock::Clock;

use super::store::WindowStore;

/// Default wake interval.
///
/// The interval should be materially longer than any configured window;
/// callers sizing against a registry use `longest_window() * 10`.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Periodic eviction of expired entries from a [`WindowStore`].
///
/// Expired entries are also replaced eagerly on access, so the sweeper only
/// bounds memory for keys that went quiet; it never affects admission
/// decisions. Removal goes through the store's shard locks, the same
/// discipline the check path uses.
pub struct Sweeper {
    store: Arc<WindowStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    grace: Duration,
}

impl Sweeper {
    /// Create a sweeper with the default interval and no grace period.
    pub fn new(store: Arc<WindowStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            interval: DEFAULT_SWEEP_INTERVAL,
            grace: Duration::ZERO,
        }
    }

    /// Override the wake interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Keep expired entries for `grace` past their reset before evicting.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run a single eviction pass, returning the number of entries removed.
    pub fn sweep_once(&self) -> usize {
        let removed = self.store.sweep(self.clock.now_millis(), self.grace);
        debug!(
            removed = removed,
            tracked = self.store.len(),
            "sweep pass completed"
        );
        removed
    }

    /// Start the background task, returning a handle for graceful shutdown.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            info!(interval = ?interval, "sweeper started");
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep_once();
                    }
                    _ = shutdown_rx.changed() => {
                        info!("sweeper stopped");
                        break;
                    }
                }
            }
        });

        SweeperHandle { shutdown_tx, task }
    }
}

/// Handle to a running sweeper task.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}
