//! Published snapshots and the per-cycle builder that produces them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Arrival, RouteId, StationArrivals, StationId, StationView};
use crate::feeds::DecodedFeed;
use crate::stations::StationCatalog;

/// Route → stop ids served by that route during the cycle.
pub type RouteIndex = BTreeMap<RouteId, BTreeSet<String>>;

/// The result of one completed refresh cycle.
///
/// Immutable once built. Stations and routes always come from the same
/// cycle because they are only ever published together.
#[derive(Debug)]
pub struct Snapshot {
    catalog: Arc<StationCatalog>,
    arrivals: BTreeMap<StationId, StationArrivals>,
    routes: RouteIndex,
    timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// A snapshot with no arrivals, stamped at `timestamp`.
    pub fn empty(catalog: Arc<StationCatalog>, timestamp: DateTime<Utc>) -> Self {
        Self {
            catalog,
            arrivals: BTreeMap::new(),
            routes: RouteIndex::new(),
            timestamp,
        }
    }

    /// When the cycle that produced this snapshot started.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether this snapshot is older than `ttl` at `now`.
    pub fn is_older_than(&self, ttl: std::time::Duration, now: DateTime<Utc>) -> bool {
        (now - self.timestamp)
            .to_std()
            .is_ok_and(|age| age > ttl)
    }

    /// Arrivals at one station, if any were recorded this cycle.
    pub fn arrivals(&self, station_id: &str) -> Option<&StationArrivals> {
        self.arrivals.get(station_id)
    }

    /// The route index.
    pub fn routes(&self) -> &RouteIndex {
        &self.routes
    }

    /// Every station in the topology, ordered by id.
    pub fn station_views(&self) -> Vec<StationView> {
        self.catalog
            .stations()
            .map(|(id, info)| StationView::new(id, info, self.arrivals.get(id)))
            .collect()
    }

    /// Stations served by `route`, each once, ordered by display name.
    ///
    /// Returns `None` if the route was not seen this cycle.
    pub fn stations_for_route(&self, route: &RouteId) -> Option<Vec<StationView>> {
        let stops = self.routes.get(route)?;

        let station_ids: BTreeSet<&StationId> = stops
            .iter()
            .filter_map(|stop_id| self.catalog.station_for_stop(stop_id))
            .collect();

        let mut views: Vec<StationView> = station_ids
            .into_iter()
            .filter_map(|id| {
                let info = self.catalog.station(id)?;
                Some(StationView::new(id, info, self.arrivals.get(id)))
            })
            .collect();
        views.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        Some(views)
    }
}

/// Working copy for one refresh cycle.
///
/// Starts from the immutable topology with no arrivals and is assembled
/// independently of the live snapshot.
#[derive(Debug)]
pub struct SnapshotBuilder {
    catalog: Arc<StationCatalog>,
    arrivals: BTreeMap<StationId, StationArrivals>,
    routes: RouteIndex,
    now: DateTime<Utc>,
    horizon: DateTime<Utc>,
}

impl SnapshotBuilder {
    /// Start a cycle at `now`, keeping predictions up to `now + window`.
    pub fn new(catalog: Arc<StationCatalog>, now: DateTime<Utc>, window: chrono::Duration) -> Self {
        Self {
            catalog,
            arrivals: BTreeMap::new(),
            routes: RouteIndex::new(),
            now,
            horizon: now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Fold one decoded feed into the working copy.
    ///
    /// Returns the number of arrivals recorded.
    pub fn add_feed(&mut self, feed: &DecodedFeed) -> usize {
        let mut added = 0;

        for trip in &feed.trips {
            let Some((route, direction)) = trip.key() else {
                continue;
            };

            for prediction in &trip.stop_times {
                if prediction.time < self.now || prediction.time > self.horizon {
                    continue;
                }

                let Some(station_id) = self.catalog.station_for_stop(&prediction.stop_id) else {
                    continue;
                };

                self.arrivals.entry(station_id.clone()).or_default().add(
                    direction,
                    Arrival::new(route.clone(), prediction.time),
                    feed.timestamp,
                );
                self.routes
                    .entry(route.clone())
                    .or_default()
                    .insert(prediction.stop_id.clone());
                added += 1;
            }
        }

        added
    }

    /// Sort and truncate every station's arrivals and seal the snapshot.
    pub fn finish(mut self, max_arrivals: usize) -> Snapshot {
        for arrivals in self.arrivals.values_mut() {
            arrivals.finalize(max_arrivals);
        }

        Snapshot {
            catalog: self.catalog,
            arrivals: self.arrivals,
            routes: self.routes,
            timestamp: self.now,
        }
    }
}



#[cfg(test)]
mod proptests {
    use super::test_support::catalog;
    use super::*;
    use crate::domain::Direction;
    use crate::feeds::{StopTimePrediction, TripRecord};
    use chrono::Duration;
    use proptest::prelude::*;

    const STOPS: [&str; 6] = ["101N", "101S", "102N", "102S", "103N", "999N"];

    fn prediction() -> impl Strategy<Value = (usize, i64, bool)> {
        (0..STOPS.len(), -600i64..7200, any::<bool>())
    }

    proptest! {
        /// Every published list is sorted, bounded, and inside the window
        #[test]
        fn fold_invariants(
            predictions in proptest::collection::vec(prediction(), 0..60),
            max_arrivals in 1usize..8,
            max_minutes in 1i64..90,
        ) {
            let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
            let trips = predictions
                .iter()
                .map(|(stop, offset_secs, north)| TripRecord {
                    route_id: "A".to_string(),
                    direction: Some(if *north { Direction::North } else { Direction::South }),
                    stop_times: vec![StopTimePrediction {
                        stop_id: STOPS[*stop].to_string(),
                        time: now + Duration::seconds(*offset_secs),
                    }],
                })
                .collect();

            let mut builder =
                SnapshotBuilder::new(catalog(), now, Duration::minutes(max_minutes));
            builder.add_feed(&DecodedFeed { timestamp: now, trips });
            let snapshot = builder.finish(max_arrivals);

            let horizon = now + Duration::minutes(max_minutes);
            for view in snapshot.station_views() {
                for list in [&view.north, &view.south] {
                    prop_assert!(list.len() <= max_arrivals);
                    prop_assert!(list.windows(2).all(|w| w[0].time <= w[1].time));
                    prop_assert!(list.iter().all(|a| a.time >= now && a.time <= horizon));
                }
            }
        }
    }
}
