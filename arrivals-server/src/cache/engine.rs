//! One refresh cycle: fetch every feed, fold, publish.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::Mutex;

use crate::feeds::{FeedDecoder, FeedFetcher};
use crate::stations::StationCatalog;

use super::config::RefreshConfig;
use super::snapshot::{Snapshot, SnapshotBuilder};
use super::store::SnapshotStore;

/// Counts for one cycle, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Feeds that were fetched and decoded.
    pub feeds_ok: usize,
    /// Feeds skipped because fetch or decode failed.
    pub feeds_failed: usize,
    /// Arrivals recorded before truncation.
    pub arrivals: usize,
}

/// Drives refresh cycles and publishes their snapshots.
///
/// Cycles are serialized: a background cycle and a read-triggered cycle
/// never run at the same time.
pub struct RefreshEngine {
    catalog: Arc<StationCatalog>,
    fetcher: Arc<dyn FeedFetcher>,
    decoder: Arc<dyn FeedDecoder>,
    store: SnapshotStore,
    config: RefreshConfig,
    cycle: Mutex<()>,
}

impl RefreshEngine {
    pub fn new(
        catalog: Arc<StationCatalog>,
        fetcher: Arc<dyn FeedFetcher>,
        decoder: Arc<dyn FeedDecoder>,
        store: SnapshotStore,
        config: RefreshConfig,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            decoder,
            store,
            config,
            cycle: Mutex::new(()),
        }
    }

    /// The store this engine publishes to.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one cycle and publish the result.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let _cycle = self.cycle.lock().await;
        self.run_and_publish().await
    }

    /// Run one cycle only if the live snapshot is older than `ttl`.
    ///
    /// If another cycle was in progress, its result is checked first, so a
    /// burst of stale reads triggers a single cycle.
    pub async fn refresh_if_older_than(&self, ttl: Duration) -> Option<Arc<Snapshot>> {
        let _cycle = self.cycle.lock().await;

        if !self.store.read().await.is_older_than(ttl, Utc::now()) {
            return None;
        }

        Some(self.run_and_publish().await)
    }

    async fn run_and_publish(&self) -> Arc<Snapshot> {
        let started = Instant::now();
        let (snapshot, stats) = self.build(Utc::now()).await;
        let snapshot = self.store.publish(snapshot).await;

        tracing::info!(
            feeds_ok = stats.feeds_ok,
            feeds_failed = stats.feeds_failed,
            arrivals = stats.arrivals,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refresh cycle published"
        );

        snapshot
    }

    /// Build a snapshot as of `now` without publishing it.
    pub async fn build(&self, now: DateTime<Utc>) -> (Snapshot, CycleStats) {
        let mut builder = SnapshotBuilder::new(Arc::clone(&self.catalog), now, self.config.window());
        let mut stats = CycleStats::default();

        let fetcher = &self.fetcher;
        let responses = join_all(
            fetcher
                .endpoints()
                .iter()
                .map(|endpoint| async move { (endpoint, fetcher.fetch(endpoint).await) }),
        )
        .await;

        for (endpoint, response) in responses {
            let bytes = match response {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(feed = %endpoint.name, error = %e, "couldn't fetch feed");
                    stats.feeds_failed += 1;
                    continue;
                }
            };

            let feed = match self.decoder.decode(&bytes) {
                Ok(feed) => feed,
                Err(e) => {
                    tracing::warn!(feed = %endpoint.name, error = %e, "couldn't decode feed");
                    stats.feeds_failed += 1;
                    continue;
                }
            };

            let added = builder.add_feed(&feed);
            tracing::debug!(
                feed = %endpoint.name,
                trips = feed.trips.len(),
                arrivals = added,
                "folded feed"
            );
            stats.feeds_ok += 1;
            stats.arrivals += added;
        }

        (builder.finish(self.config.max_arrivals), stats)
    }
}
