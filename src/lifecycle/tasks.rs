//! Ownership of spawned background tasks.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Named background tasks sharing one cancellation token.
///
/// Tasks are expected to observe the token and finish their own cleanup
/// (final flush, last sweep) before returning.
#[derive(Debug, Default)]
pub struct BackgroundTasks {
    cancel: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token handed to every task spawned through this set.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(task = name, "Spawning background task");
        self.handles.push((name, tokio::spawn(task)));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancel every task and wait up to `grace` for each to finish.
    ///
    /// Tasks still running after the deadline are aborted.
    pub async fn shutdown(&mut self, grace: Duration) {
        self.cancel.cancel();

        for (name, mut handle) in self.handles.drain(..) {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(Ok(())) => tracing::debug!(task = name, "Background task stopped"),
                Ok(Err(e)) => tracing::error!(task = name, error = %e, "Background task failed"),
                Err(_) => {
                    tracing::warn!(
                        task = name,
                        grace_ms = grace.as_millis() as u64,
                        "Background task did not stop in time, aborting"
                    );
                    handle.abort();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_shutdown_waits_for_cleanup() {
        let mut tasks = BackgroundTasks::new();
        let cleaned_up = Arc::new(AtomicBool::new(false));

        let token = tasks.token();
        let flag = cleaned_up.clone();
        tasks.spawn("worker", async move {
            token.cancelled().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(tasks.len(), 1);

        tasks.shutdown(Duration::from_secs(1)).await;
        assert!(cleaned_up.load(Ordering::SeqCst));
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_stuck_task_is_aborted() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("stuck", async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        let started = std::time::Instant::now();
        tasks.shutdown(Duration::from_millis(50)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(tasks.is_empty());
    }
}
