//! Periodic removal of expired state.

use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;

/// `tokio::time::interval` rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Something holding expirable entries.
pub trait Sweepable: Send + Sync + 'static {
    /// Name for logs.
    fn label(&self) -> &'static str;

    /// Drop expired entries, returning how many were removed.
    fn sweep(&self) -> usize;
}

/// Sweep every target on `interval` until `cancel` fires.
pub async fn run_sweeper(
    targets: Vec<Arc<dyn Sweepable>>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        targets = targets.len(),
        "Sweeper starting"
    );

    let mut ticker = time::interval(interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    // First tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep_all(&targets);
            }
            _ = cancel.cancelled() => {
                tracing::info!("Sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

/// One pass over every target.
pub fn sweep_all(targets: &[Arc<dyn Sweepable>]) -> usize {
    let mut total = 0;
    for target in targets {
        let removed = target.sweep();
        if removed > 0 {
            tracing::debug!(target = target.label(), removed, "Swept expired entries");
        }
        total += removed;
    }
    total
}
