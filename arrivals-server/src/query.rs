//! Read side of the cache.
//!
//! Every read goes through the expiration controller first, then reads the
//! live snapshot once and answers entirely from it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::{ExpirationController, SnapshotStore};
use crate::domain::{InvalidRouteId, RouteId, StationView};

/// Errors from a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The route had no trips in the current snapshot.
    #[error("no trains found for route {0}")]
    RouteNotFound(RouteId),

    /// The route id could not be parsed.
    #[error(transparent)]
    InvalidRoute(#[from] InvalidRouteId),
}

/// Answers arrival queries from the live snapshot.
pub struct QueryService {
    store: SnapshotStore,
    expiry: ExpirationController,
}

impl QueryService {
    pub fn new(store: SnapshotStore, expiry: ExpirationController) -> Self {
        Self { store, expiry }
    }

    /// Every station with its current arrivals, ordered by station id.
    pub async fn get_all(&self) -> Vec<StationView> {
        self.expiry.ensure_fresh().await;
        self.store.read().await.station_views()
    }

    /// Stations served by `route`, each once, ordered by name.
    ///
    /// Route ids are case-insensitive.
    pub async fn get_by_route(&self, route: &str) -> Result<Vec<StationView>, QueryError> {
        let route = RouteId::parse(route)?;
        self.expiry.ensure_fresh().await;

        let snapshot = self.store.read().await;
        snapshot.stations_for_route(&route).ok_or_else(|| {
            tracing::debug!(route = %route, "route not in current snapshot");
            QueryError::RouteNotFound(route)
        })
    }

    /// Routes with at least one trip in the current snapshot, sorted.
    pub async fn get_routes(&self) -> Vec<RouteId> {
        self.expiry.ensure_fresh().await;
        self.store.read().await.routes().keys().cloned().collect()
    }

    /// When the live snapshot was built.
    pub async fn last_refreshed(&self) -> DateTime<Utc> {
        self.store.read().await.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_support::catalog;
    use crate::cache::{RefreshConfig, RefreshEngine, Snapshot};
    use crate::feeds::fixtures::{encode, trip};
    use crate::feeds::{GtfsRealtimeDecoder, MockFeedFetcher};
    use std::sync::Arc;
    use std::time::Duration;

    /// A query service over a single mock feed, refreshed inline with a TTL.
    fn service(fetcher: MockFeedFetcher) -> (QueryService, Arc<MockFeedFetcher>) {
        let catalog = catalog();
        let fetcher = Arc::new(fetcher);
        let store = SnapshotStore::new(Snapshot::empty(
            Arc::clone(&catalog),
            DateTime::UNIX_EPOCH,
        ));
        let engine = Arc::new(RefreshEngine::new(
            catalog,
            Arc::clone(&fetcher) as _,
            Arc::new(GtfsRealtimeDecoder),
            store.clone(),
            RefreshConfig::new(10, 60),
        ));
        let expiry = ExpirationController::new(engine, None, Some(Duration::from_secs(60)));
        (QueryService::new(store, expiry), fetcher)
    }

    fn scenario_feed() -> MockFeedFetcher {
        let now = Utc::now().timestamp();
        MockFeedFetcher::new().with_payload(
            "nqrw",
            encode(
                now as u64,
                vec![
                    trip("1..N", "A", &[("101N", now + 120)]),
                    trip("2..S", "G", &[("103S", now + 240), ("101S", now + 300)]),
                ],
            ),
        )
    }

    #[tokio::test]
    async fn get_all_returns_every_station_by_id() {
        let (service, _) = service(scenario_feed());

        let stations = service.get_all().await;

        let ids: Vec<_> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2", "S3"]);

        let s1 = &stations[0];
        assert_eq!(s1.north.len(), 1);
        assert_eq!(s1.north[0].route.as_str(), "A");
        assert!(stations[1].north.is_empty());
        assert!(stations[1].last_update.is_none());
    }

    #[tokio::test]
    async fn route_lookup_is_case_insensitive() {
        let (service, _) = service(scenario_feed());

        let lower = service.get_by_route("g").await.unwrap();
        let upper = service.get_by_route("G").await.unwrap();

        assert_eq!(lower, upper);
    }

    #[tokio::test]
    async fn route_stations_are_unique_and_sorted_by_name() {
        let (service, _) = service(scenario_feed());

        let stations = service.get_by_route("G").await.unwrap();

        let names: Vec<_> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Astor Pl", "First Av"]);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (service, _) = service(scenario_feed());

        let err = service.get_by_route("Z").await.unwrap_err();

        assert!(matches!(err, QueryError::RouteNotFound(ref r) if r.as_str() == "Z"));
        assert_eq!(err.to_string(), "no trains found for route Z");
    }

    #[tokio::test]
    async fn blank_route_is_invalid() {
        let (service, fetcher) = service(scenario_feed());

        let err = service.get_by_route("  ").await.unwrap_err();

        assert!(matches!(err, QueryError::InvalidRoute(_)));
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn routes_refresh_inline_and_are_sorted() {
        let (service, fetcher) = service(scenario_feed());

        let routes: Vec<_> = service
            .get_routes()
            .await
            .iter()
            .map(|r| r.as_str().to_string())
            .collect();

        assert_eq!(routes, vec!["A", "G"]);
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn reads_within_ttl_share_one_cycle() {
        let (service, fetcher) = service(scenario_feed());

        service.get_all().await;
        let refreshed = service.last_refreshed().await;
        service.get_by_route("A").await.unwrap();
        service.get_all().await;

        assert_eq!(fetcher.fetch_count(), 1);
        assert_eq!(service.last_refreshed().await, refreshed);
        assert!(refreshed > DateTime::<Utc>::UNIX_EPOCH);
    }
}
