//! Snapshot cache for subway arrivals.
//!
//! A refresh cycle fetches every feed, folds the trips into a fresh
//! [`Snapshot`] and swaps it into the [`SnapshotStore`] in one step. Readers
//! always see one complete cycle, never a mix.
//!
//! Freshness is kept in one of two ways:
//! - a [`BackgroundRefresher`] runs a cycle every period and is restarted
//!   on the next read if it ever dies
//! - without one, a read that finds the snapshot older than the TTL runs a
//!   cycle inline before serving

mod config;
mod engine;
mod expiry;
mod refresher;
mod snapshot;
mod store;

pub use config::{CacheConfig, RefreshConfig};
pub use engine::{CycleStats, RefreshEngine};
pub use expiry::{ExpirationController, Freshness};
pub use refresher::BackgroundRefresher;
pub use snapshot::{RouteIndex, Snapshot, SnapshotBuilder};
pub use store::SnapshotStore;

#[cfg(test)]
pub(crate) use snapshot::test_support;
