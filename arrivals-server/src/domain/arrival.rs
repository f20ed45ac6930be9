//! Direction codes and arrival entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RouteId;

/// Direction of travel, as encoded in feed stop and trip ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
}

impl Direction {
    /// Parse a one-letter direction code (`N` or `S`, either case).
    pub fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Direction::North),
            'S' => Some(Direction::South),
            _ => None,
        }
    }

    /// The one-letter code for this direction.
    pub fn code(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::South => 'S',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single predicted arrival of a route at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrival {
    /// Route of the arriving vehicle.
    pub route: RouteId,
    /// Predicted arrival time.
    pub time: DateTime<Utc>,
}

impl Arrival {
    pub fn new(route: RouteId, time: DateTime<Utc>) -> Self {
        Self { route, time }
    }
}
