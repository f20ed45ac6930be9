//! Decoding of GTFS-realtime payloads into trip records.
//!
//! The refresh engine only needs, per trip: which route, which direction,
//! and a list of (stop, predicted time) pairs. Everything else in the feed
//! is ignored.

use chrono::{DateTime, Utc};
use gtfs_rt::trip_update::StopTimeUpdate;
use gtfs_rt::{FeedMessage, TripUpdate};
use prost::Message;

use crate::domain::{Direction, RouteId};

use super::error::DecodeError;

/// A decoded feed message.
#[derive(Debug, Clone)]
pub struct DecodedFeed {
    /// When the upstream generated the message.
    pub timestamp: DateTime<Utc>,
    /// Trip entities in feed order.
    pub trips: Vec<TripRecord>,
}

/// A predicted arrival at one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimePrediction {
    pub stop_id: String,
    pub time: DateTime<Utc>,
}

/// One vehicle's journey as reported by a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRecord {
    /// Route id as reported (not yet normalized).
    pub route_id: String,
    /// Direction of travel, if it could be determined.
    pub direction: Option<Direction>,
    /// Stop-time predictions in feed order.
    pub stop_times: Vec<StopTimePrediction>,
}

impl TripRecord {
    /// The normalized route and direction, or `None` if the trip is not usable.
    pub fn key(&self) -> Option<(RouteId, Direction)> {
        let route = RouteId::parse(&self.route_id).ok()?;
        Some((route, self.direction?))
    }
}

/// Turns raw feed bytes into trip records.
pub trait FeedDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedFeed, DecodeError>;
}

/// Decoder for GTFS-realtime protobuf feeds using the NYCT trip id
/// conventions for direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct GtfsRealtimeDecoder;

impl FeedDecoder for GtfsRealtimeDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedFeed, DecodeError> {
        let message = FeedMessage::decode(bytes)?;

        let timestamp = message
            .header
            .timestamp
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now);

        let trips = message
            .entity
            .into_iter()
            .filter(|entity| !entity.is_deleted.unwrap_or(false))
            .filter_map(|entity| entity.trip_update)
            .map(trip_record)
            .collect();

        Ok(DecodedFeed { timestamp, trips })
    }
}

fn trip_record(update: TripUpdate) -> TripRecord {
    let stop_times: Vec<StopTimePrediction> = update
        .stop_time_update
        .into_iter()
        .filter_map(stop_time_prediction)
        .collect();

    let direction = update
        .trip
        .trip_id
        .as_deref()
        .and_then(direction_from_trip_id)
        .or_else(|| {
            stop_times
                .first()
                .and_then(|st| direction_from_stop_id(&st.stop_id))
        });

    TripRecord {
        route_id: update.trip.route_id.unwrap_or_default(),
        direction,
        stop_times,
    }
}

/// Arrival time if present, otherwise departure time.
fn stop_time_prediction(update: StopTimeUpdate) -> Option<StopTimePrediction> {
    let stop_id = update.stop_id?;
    let secs = update
        .arrival
        .and_then(|event| event.time)
        .or_else(|| update.departure.and_then(|event| event.time))?;

    Some(StopTimePrediction {
        stop_id,
        time: DateTime::from_timestamp(secs, 0)?,
    })
}

/// NYCT trip ids carry the direction after a double dot: `036650_1..N03R`.
fn direction_from_trip_id(trip_id: &str) -> Option<Direction> {
    let (_, rest) = trip_id.split_once("..")?;
    rest.chars().next().and_then(Direction::from_code)
}

/// NYCT stop ids end in the platform direction: `101N`.
fn direction_from_stop_id(stop_id: &str) -> Option<Direction> {
    stop_id.chars().last().and_then(Direction::from_code)
}

/// Builders for GTFS-realtime payloads, shared by tests across the crate.
#[cfg(test)]
pub(crate) mod fixtures {
    use gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
    use gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, TripDescriptor, TripUpdate};
    use prost::Message;

    /// A trip for `route` with `(stop_id, unix_time)` arrivals.
    pub fn trip(trip_id: &str, route: &str, stops: &[(&str, i64)]) -> FeedEntity {
        FeedEntity {
            id: trip_id.to_string(),
            trip_update: Some(TripUpdate {
                trip: TripDescriptor {
                    trip_id: Some(trip_id.to_string()),
                    route_id: Some(route.to_string()),
                    ..Default::default()
                },
                stop_time_update: stops
                    .iter()
                    .map(|(stop_id, time)| StopTimeUpdate {
                        stop_id: Some(stop_id.to_string()),
                        arrival: Some(StopTimeEvent {
                            time: Some(*time),
                            ..Default::default()
                        }),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Encode entities into a feed generated at `timestamp`.
    pub fn encode(timestamp: u64, entities: Vec<FeedEntity>) -> Vec<u8> {
        FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "1.0".to_string(),
                timestamp: Some(timestamp),
                ..Default::default()
            },
            entity: entities,
        }
        .encode_to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{encode, trip};
    use super::*;
    use gtfs_rt::trip_update::StopTimeEvent;
    use gtfs_rt::{FeedEntity, FeedHeader};

    const T0: i64 = 1_700_000_000;

    #[test]
    fn decodes_trips_and_header_timestamp() {
        let bytes = encode(
            T0 as u64,
            vec![trip("036650_A..N03R", "A", &[("101N", T0 + 60), ("102N", T0 + 120)])],
        );

        let feed = GtfsRealtimeDecoder.decode(&bytes).unwrap();

        assert_eq!(feed.timestamp.timestamp(), T0);
        assert_eq!(feed.trips.len(), 1);
        let record = &feed.trips[0];
        assert_eq!(record.route_id, "A");
        assert_eq!(record.direction, Some(Direction::North));
        assert_eq!(record.stop_times.len(), 2);
        assert_eq!(record.stop_times[1].stop_id, "102N");
        assert_eq!(record.stop_times[1].time.timestamp(), T0 + 120);
    }

    #[test]
    fn direction_falls_back_to_stop_suffix() {
        let bytes = encode(T0 as u64, vec![trip("no-dots", "g", &[("G22S", T0)])]);

        let feed = GtfsRealtimeDecoder.decode(&bytes).unwrap();

        assert_eq!(feed.trips[0].direction, Some(Direction::South));
        assert_eq!(feed.trips[0].key().unwrap().0.as_str(), "G");
    }

    #[test]
    fn trip_without_route_is_invalid() {
        let bytes = encode(T0 as u64, vec![trip("1..S", "", &[("101S", T0)])]);

        let feed = GtfsRealtimeDecoder.decode(&bytes).unwrap();

        assert!(feed.trips[0].key().is_none());
    }

    #[test]
    fn trip_without_direction_is_invalid() {
        let bytes = encode(T0 as u64, vec![trip("1", "A", &[("101", T0)])]);

        let feed = GtfsRealtimeDecoder.decode(&bytes).unwrap();

        assert_eq!(feed.trips[0].direction, None);
        assert!(feed.trips[0].key().is_none());
    }

    #[test]
    fn departure_time_used_when_arrival_missing() {
        let mut entity = trip("1..N", "A", &[]);
        let update = entity.trip_update.as_mut().unwrap();
        update.stop_time_update.push(StopTimeUpdate {
            stop_id: Some("101N".to_string()),
            departure: Some(StopTimeEvent {
                time: Some(T0 + 30),
                ..Default::default()
            }),
            ..Default::default()
        });
        update.stop_time_update.push(StopTimeUpdate {
            stop_id: Some("102N".to_string()),
            ..Default::default()
        });

        let feed = GtfsRealtimeDecoder
            .decode(&encode(T0 as u64, vec![entity]))
            .unwrap();

        let stop_times = &feed.trips[0].stop_times;
        assert_eq!(stop_times.len(), 1);
        assert_eq!(stop_times[0].time.timestamp(), T0 + 30);
    }

    #[test]
    fn skips_deleted_and_non_trip_entities() {
        let mut deleted = trip("1..N", "A", &[("101N", T0)]);
        deleted.is_deleted = Some(true);
        let vehicle_only = FeedEntity {
            id: "v1".to_string(),
            ..Default::default()
        };

        let feed = GtfsRealtimeDecoder
            .decode(&encode(T0 as u64, vec![deleted, vehicle_only]))
            .unwrap();

        assert!(feed.trips.is_empty());
    }

    #[test]
    fn missing_header_timestamp_uses_decode_time() {
        let bytes = FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "1.0".to_string(),
                ..Default::default()
            },
            entity: vec![],
        }
        .encode_to_vec();

        let before = Utc::now();
        let feed = GtfsRealtimeDecoder.decode(&bytes).unwrap();

        assert!(feed.timestamp >= before - chrono::Duration::seconds(1));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let result = GtfsRealtimeDecoder.decode(&[0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(DecodeError::Protobuf(_))));
    }

    #[test]
    fn trip_id_direction_parsing() {
        assert_eq!(direction_from_trip_id("036650_1..N03R"), Some(Direction::North));
        assert_eq!(direction_from_trip_id("036650_1..S03R"), Some(Direction::South));
        assert_eq!(direction_from_trip_id("036650_1.."), None);
        assert_eq!(direction_from_trip_id("036650_1"), None);
    }
}
