//! Background eviction of expired client windows.
//!
//! # Responsibilities
//! - Periodically sweep every route guard
//! - Publish tracked-key gauges and eviction counters
//! - Stop on shutdown broadcast

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::admission::middleware::RouteGuard;
use crate::observability::metrics;

pub struct Sweeper {
    guards: Vec<RouteGuard>,
    interval: Duration,
    retention_multiplier: u32,
}

impl Sweeper {
    pub fn new(guards: Vec<RouteGuard>, interval: Duration, retention_multiplier: u32) -> Self {
        Self {
            guards,
            interval,
            retention_multiplier,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            retention_multiplier = self.retention_multiplier,
            "Admission sweeper starting"
        );

        let mut ticker = time::interval(self.interval);
        // First tick fires immediately; nothing to sweep yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_all();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Admission sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Sweep every guard once. Returns the total number of evicted entries.
    pub fn sweep_all(&self) -> usize {
        sweep_guards(&self.guards, self.retention_multiplier)
    }
}

/// Sweep `guards` once, publishing per-route gauges.
pub fn sweep_guards(guards: &[RouteGuard], retention_multiplier: u32) -> usize {
    let mut total = 0;
    for guard in guards {
        let evicted = guard.sweep(retention_multiplier);
        let remaining = guard.tracked_keys();
        metrics::record_evictions(guard.name(), evicted);
        metrics::record_tracked_keys(guard.name(), remaining);

        if evicted > 0 {
            tracing::debug!(route = %guard.name(), evicted, remaining, "Swept expired client windows");
        }
        total += evicted;
    }
    total
}
