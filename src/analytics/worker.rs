//! Background refresh worker.
//!
//! Wraps the snapshot computation in an explicit repeating task with a
//! start/stop lifecycle. One cycle runs immediately on spawn, then one
//! per interval. The loop structure guarantees at most one cycle in
//! flight: the next tick is not awaited until the previous cycle has
//! finished, so a slow fetch can never be overtaken by a later, faster
//! one. Stopping the worker abandons any in-flight fetch before it can
//! publish.

use crate::analytics::aggregator::refresh;
use crate::models::AnalyticsSnapshot;
use crate::store::KvStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Default refresh interval: 2.5 hours, same cadence as the dashboard.
pub const DEFAULT_REFRESH_SECS: u64 = 9000;

/// Options for a worker instance.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Key pattern to read, e.g. `resume:*`.
    pub pattern: String,
    /// Time between refresh cycles.
    pub interval: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            pattern: "resume:*".to_string(),
            interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

/// Handle to a running refresh task.
///
/// Exposes the current snapshot (absent until the first successful cycle,
/// and again after any failed one) and a loading flag. Dropping the
/// handle, or calling [`stop`](Self::stop), terminates the task; no
/// snapshot or loading write happens after that.
pub struct AnalyticsWorker {
    snapshot_rx: watch::Receiver<Option<AnalyticsSnapshot>>,
    loading_rx: watch::Receiver<bool>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AnalyticsWorker {
    /// Spawn the refresh task against an injected store.
    pub fn spawn(store: Arc<dyn KvStore>, options: WorkerOptions) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (loading_tx, loading_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_loop(
            store,
            options,
            snapshot_tx,
            loading_tx,
            shutdown_rx,
        ));

        Self {
            snapshot_rx,
            loading_rx,
            shutdown_tx,
            task,
        }
    }

    /// Latest published snapshot, if any.
    #[allow(dead_code)] // Polling accessor for embedding consumers
    pub fn snapshot(&self) -> Option<AnalyticsSnapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// Whether a refresh cycle is currently running.
    #[allow(dead_code)] // Polling accessor for embedding consumers
    pub fn loading(&self) -> bool {
        *self.loading_rx.borrow()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<AnalyticsSnapshot>> {
        self.snapshot_rx.clone()
    }

    /// Stop the task and wait for it to finish.
    ///
    /// An in-flight fetch is abandoned; once this returns, no further
    /// snapshot is published.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }
}

async fn run_loop(
    store: Arc<dyn KvStore>,
    options: WorkerOptions,
    snapshot_tx: watch::Sender<Option<AnalyticsSnapshot>>,
    loading_tx: watch::Sender<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = time::interval(options.interval);
    // A cycle slower than the interval delays the next tick instead of
    // queueing a burst behind it.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = interval.tick() => {
                let _ = loading_tx.send(true);

                let result = tokio::select! {
                    result = refresh(store.as_ref(), &options.pattern) => result,
                    // Teardown while the fetch is in flight: abandon it
                    // without publishing anything.
                    _ = shutdown_rx.changed() => break,
                };

                if *shutdown_rx.borrow() {
                    break;
                }

                match result {
                    Ok(snapshot) => {
                        debug!(
                            resumes = snapshot.total_resumes,
                            analyses = snapshot.total_analyses,
                            "published analytics snapshot"
                        );
                        let _ = snapshot_tx.send(Some(snapshot));
                    }
                    Err(e) => {
                        warn!(error = %e, "refresh cycle failed, clearing snapshot");
                        let _ = snapshot_tx.send(None);
                    }
                }
                let _ = loading_tx.send(false);
            }
        }
    }
}
