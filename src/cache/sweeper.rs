//! Background age sweep for the response cache.
//!
//! # Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use std::sync::Arc;
//! use inkpost::cache::{CacheSweeper, ResponseCache, DEFAULT_MAX_AGE, DEFAULT_SWEEP_INTERVAL};
//!
//! let cache = Arc::new(ResponseCache::new());
//! let sweeper = CacheSweeper::start(cache.clone(), DEFAULT_SWEEP_INTERVAL, DEFAULT_MAX_AGE);
//! assert!(sweeper.is_running());
//! sweeper.stop().await;
//! # });
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ResponseCache;

/// Default interval between sweeps (5 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Shortest interval the sweeper accepts; smaller values are raised to it.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running sweep task.
///
/// Call [`CacheSweeper::stop`] on shutdown. Dropping the handle without
/// stopping aborts the task.
pub struct CacheSweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl CacheSweeper {
    /// Spawn a task that calls [`ResponseCache::invalidate_older_than`] every
    /// `interval`. The first sweep happens one full interval after start.
    /// An `interval` below [`MIN_SWEEP_INTERVAL`] is raised to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(cache: Arc<ResponseCache>, interval: Duration, max_age: Duration) -> Self {
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // skip first immediate tick

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.invalidate_older_than(max_age);
                        debug!(removed, remaining = cache.len(), "Cache sweep complete");
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("Cache sweeper shutting down");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Signal the task to stop and wait for it to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Cache sweeper task failed");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
