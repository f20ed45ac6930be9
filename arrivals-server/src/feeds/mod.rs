//! MTA subway real-time feeds.
//!
//! The subway publishes one GTFS-realtime protobuf feed per line family.
//! Every feed requires the API key in the `x-api-key` header.
//!
//! Failures here are always per endpoint: a feed that cannot be fetched or
//! decoded is skipped for the current cycle and retried on the next one.

mod client;
mod decode;
mod error;
mod mock;

pub use client::{FeedClient, FeedClientConfig, FeedEndpoint, FeedFetcher, default_endpoints};
pub use decode::{DecodedFeed, FeedDecoder, GtfsRealtimeDecoder, StopTimePrediction, TripRecord};
pub use error::{DecodeError, FeedError};
pub use mock::MockFeedFetcher;

#[cfg(test)]
pub(crate) use decode::fixtures;
