//! Real-time subway arrivals server.
//!
//! Polls the MTA GTFS-realtime feeds, folds the predictions into
//! per-station arrival boards and serves them as JSON.

pub mod cache;
pub mod config;
pub mod domain;
pub mod feeds;
pub mod query;
pub mod stations;
pub mod web;
