//! Station types: static topology plus per-cycle arrivals.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Arrival, Direction, RouteId};

/// Station identifier as used in the topology file.
pub type StationId = String;

/// Geographic position as `[latitude, longitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates(pub f64, pub f64);

/// Static attributes of a station, loaded once from the topology file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationInfo {
    /// Display name.
    pub name: String,

    /// Position of the station.
    pub location: Coordinates,

    /// Feed stop ids aggregated by this station.
    ///
    /// The topology file may list them as an array or as an object keyed by
    /// stop id (per-platform details are ignored).
    #[serde(deserialize_with = "deserialize_stop_ids")]
    pub stops: Vec<String>,

    /// Any other attributes in the topology file, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStops {
    List(Vec<String>),
    Keyed(Map<String, Value>),
}

fn deserialize_stop_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawStops::deserialize(deserializer)? {
        RawStops::List(stops) => stops,
        RawStops::Keyed(stops) => stops.into_iter().map(|(id, _)| id).collect(),
    })
}

/// Dynamic attributes of a station, rebuilt from scratch every refresh cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationArrivals {
    /// Northbound arrivals, ascending by time once finalized.
    pub north: Vec<Arrival>,

    /// Southbound arrivals, ascending by time once finalized.
    pub south: Vec<Arrival>,

    /// Routes observed at this station during the cycle.
    pub routes: BTreeSet<RouteId>,

    /// Timestamp of the freshest feed message that contributed.
    pub last_update: Option<DateTime<Utc>>,
}

impl StationArrivals {
    /// Record an arrival reported by a feed generated at `feed_time`.
    pub fn add(&mut self, direction: Direction, arrival: Arrival, feed_time: DateTime<Utc>) {
        self.routes.insert(arrival.route.clone());
        match direction {
            Direction::North => self.north.push(arrival),
            Direction::South => self.south.push(arrival),
        }
        self.last_update = Some(match self.last_update {
            Some(previous) => previous.max(feed_time),
            None => feed_time,
        });
    }

    /// Sort both directions by predicted time and keep the first `max_arrivals`.
    pub fn finalize(&mut self, max_arrivals: usize) {
        for list in [&mut self.north, &mut self.south] {
            list.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.route.cmp(&b.route)));
            list.truncate(max_arrivals);
        }
    }
}

/// A station as returned to clients: static and dynamic attributes merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    pub id: StationId,
    pub name: String,
    pub location: Coordinates,
    pub stops: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(rename = "N")]
    pub north: Vec<Arrival>,
    #[serde(rename = "S")]
    pub south: Vec<Arrival>,
    pub routes: BTreeSet<RouteId>,
    pub last_update: Option<DateTime<Utc>>,
}

impl StationView {
    /// Merge a station's static info with this cycle's arrivals.
    pub fn new(id: &str, info: &StationInfo, arrivals: Option<&StationArrivals>) -> Self {
        let arrivals = arrivals.cloned().unwrap_or_default();
        Self {
            id: id.to_string(),
            name: info.name.clone(),
            location: info.location,
            stops: info.stops.clone(),
            extra: info.extra.clone(),
            north: arrivals.north,
            south: arrivals.south,
            routes: arrivals.routes,
            last_update: arrivals.last_update,
        }
    }
}
