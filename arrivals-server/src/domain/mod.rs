//! Domain types for the arrivals service.
//!
//! Route ids are normalized at construction, so code that receives a
//! `RouteId` never needs to worry about case again.

mod arrival;
mod route;
mod station;

pub use arrival::{Arrival, Direction};
pub use route::{InvalidRouteId, RouteId};
pub use station::{Coordinates, StationArrivals, StationId, StationInfo, StationView};
