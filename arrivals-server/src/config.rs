//! Process configuration from environment variables.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::{CacheConfig, RefreshConfig};

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5000));
const DEFAULT_CACHE_SECONDS: u64 = 60;
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 10;

/// Longest arrival window accepted from `MAX_MINUTES`, one day.
const MAX_WINDOW_MINUTES: i64 = 24 * 60;

/// Errors reading the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Feed API key (`MTA_KEY`).
    pub api_key: String,

    /// Station topology file (`STATIONS_FILE`).
    pub stations_file: PathBuf,

    pub refresh: RefreshConfig,
    pub cache: CacheConfig,

    /// Path prefix the routes are also served under (`WEB_ROOT`).
    pub web_root: String,

    pub bind_addr: SocketAddr,

    /// Per-request feed timeout.
    pub feed_timeout: Duration,
}

impl AppConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("MTA_KEY").ok_or(ConfigError::Missing("MTA_KEY"))?;
        let stations_file = get("STATIONS_FILE")
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("STATIONS_FILE"))?;

        let defaults = RefreshConfig::default();
        let max_arrivals = parse_or(get("MAX_TRAINS"), "MAX_TRAINS", defaults.max_arrivals)?;
        let max_minutes = parse_or(get("MAX_MINUTES"), "MAX_MINUTES", defaults.max_minutes)?;
        if !(0..=MAX_WINDOW_MINUTES).contains(&max_minutes) {
            return Err(ConfigError::Invalid {
                var: "MAX_MINUTES",
                value: max_minutes.to_string(),
            });
        }

        let cache_seconds = parse_or(get("CACHE_SECONDS"), "CACHE_SECONDS", DEFAULT_CACHE_SECONDS)?;
        let background = match get("THREADED") {
            Some(value) => parse_flag("THREADED", &value)?,
            None => true,
        };

        let bind_addr = parse_or(get("BIND_ADDR"), "BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let feed_timeout = parse_or(
            get("FEED_TIMEOUT_SECS"),
            "FEED_TIMEOUT_SECS",
            DEFAULT_FEED_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_key,
            stations_file,
            refresh: RefreshConfig::new(max_arrivals, max_minutes),
            cache: CacheConfig::from_seconds(cache_seconds, background),
            web_root: normalize_web_root(get("WEB_ROOT").as_deref().unwrap_or("")),
            bind_addr,
            feed_timeout: Duration::from_secs(feed_timeout),
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
        }),
    }
}

/// `"arrivals/"` → `"/arrivals"`; empty and `"/"` → `""`.
fn normalize_web_root(root: &str) -> String {
    let trimmed = root.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
