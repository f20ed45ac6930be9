//! Per-read freshness decision.

use std::sync::Arc;
use std::time::Duration;

use super::engine::RefreshEngine;
use super::refresher::BackgroundRefresher;

/// What the controller did before a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The live snapshot was served as-is.
    Current,
    /// The background refresher had died and was restarted; the live
    /// snapshot may be stale.
    RefresherRestarted,
    /// The snapshot had expired and a cycle ran before serving.
    Refreshed,
}

/// Decides whether a read must refresh first.
///
/// With a background refresher, age never forces a synchronous refresh;
/// the refresher is only restarted if it has died. Without one, a snapshot
/// older than the TTL is rebuilt inline.
pub struct ExpirationController {
    engine: Arc<RefreshEngine>,
    refresher: Option<Arc<BackgroundRefresher>>,
    ttl: Option<Duration>,
}

impl ExpirationController {
    pub fn new(
        engine: Arc<RefreshEngine>,
        refresher: Option<Arc<BackgroundRefresher>>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            engine,
            refresher,
            ttl,
        }
    }

    /// Make the live snapshot fit to serve.
    pub async fn ensure_fresh(&self) -> Freshness {
        if let Some(refresher) = &self.refresher {
            return if refresher.restart_if_dead() {
                Freshness::RefresherRestarted
            } else {
                Freshness::Current
            };
        }

        match self.ttl {
            Some(ttl) => match self.engine.refresh_if_older_than(ttl).await {
                Some(_) => Freshness::Refreshed,
                None => Freshness::Current,
            },
            None => Freshness::Current,
        }
    }
}
