//! Background fetching of movies for queue slots that are still empty
//!
//! A prefetch never touches the session. Its result is handed back through
//! the task handle and applied by the game driver on its own turn.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::catalog::{fetch_random_movie, CatalogFetcher};
use crate::types::{Era, MovieRecord};

/// Spawns movie fetches against a catalog
#[derive(Clone)]
pub struct Prefetcher {
    catalog: Arc<dyn CatalogFetcher>,
    attempts: u32,
}

/// A movie fetch running in the background for one queue slot
pub struct PendingMovie {
    slot: usize,
    handle: JoinHandle<Option<MovieRecord>>,
}

impl Prefetcher {
    pub fn new(catalog: Arc<dyn CatalogFetcher>, attempts: u32) -> Self {
        Self { catalog, attempts }
    }

    /// Start fetching a movie for `slot` in the background
    pub fn spawn(&self, slot: usize, era: Option<&'static Era>) -> PendingMovie {
        let catalog = self.catalog.clone();
        let attempts = self.attempts;

        tracing::debug!("Prefetching movie for slot {}", slot);
        let handle =
            tokio::spawn(async move { fetch_random_movie(catalog.as_ref(), era, attempts).await });

        PendingMovie { slot, handle }
    }

    /// Fetch synchronously, used when no prefetch result is available
    pub async fn fetch_now(&self, era: Option<&'static Era>) -> Option<MovieRecord> {
        fetch_random_movie(self.catalog.as_ref(), era, self.attempts).await
    }
}

impl PendingMovie {
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Wait up to `timeout` for the result.
    ///
    /// A timed-out fetch is left to finish on its own; its result is dropped.
    pub async fn wait(self, timeout: Duration) -> Option<MovieRecord> {
        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(movie)) => movie,
            Ok(Err(e)) => {
                tracing::error!("Prefetch task for slot {} failed: {}", self.slot, e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Prefetch for slot {} still running after {:?}",
                    self.slot,
                    timeout
                );
                None
            }
        }
    }
}
