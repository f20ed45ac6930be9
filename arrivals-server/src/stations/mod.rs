//! Station topology.
//!
//! Provides the station list and the feed stop id → station mapping,
//! loaded from a JSON file at startup.

mod catalog;
mod error;

pub use catalog::StationCatalog;
pub use error::CatalogError;
