use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{Clock, DedupStore};

/// Periodically evicts expired entries to bound memory. Admission stays correct
/// without it; this only reclaims space. Stops when `shutdown` fires or closes.
pub fn spawn_sweeper(
    store: Arc<dyn DedupStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.sweep(clock.now());
                    tracing::debug!(
                        stage = "dedup.sweep",
                        removed = removed,
                        remaining = store.len()
                    );
                }
                _ = shutdown.recv() => {
                    tracing::debug!(stage = "dedup.sweep", "sweeper stopping");
                    break;
                }
            }
        }
    })
}
