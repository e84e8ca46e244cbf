//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries that were never
//! looked up again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheRegistry, Clock};

/// Spawns a background task that periodically purges expired entries from
/// every cache in `registry`.
///
/// The task runs until aborted, sleeping for `interval` between sweeps. Each
/// cache is write-locked only for the duration of its own sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(CacheRegistry::from_config(&config));
/// let cleanup_handle = spawn_cleanup_task(registry.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<C>(registry: Arc<CacheRegistry<C>>, interval: Duration) -> JoinHandle<()>
where
    C: Clock + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting expiry sweep over {} caches every {:?}",
            registry.len(),
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.purge_expired().await;

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
