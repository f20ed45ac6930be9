//! Configuration for refresh cycles and cache expiry.

use std::time::Duration;

/// Parameters of a single refresh cycle.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Maximum arrivals kept per station and direction.
    pub max_arrivals: usize,

    /// How far ahead predictions are kept (minutes).
    pub max_minutes: i64,
}

impl RefreshConfig {
    pub fn new(max_arrivals: usize, max_minutes: i64) -> Self {
        Self {
            max_arrivals,
            max_minutes,
        }
    }

    /// Returns the look-ahead window as a Duration, saturating when
    /// `max_minutes` is out of chrono's range.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.max_minutes).unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_arrivals: 10,
            max_minutes: 30,
        }
    }
}

/// How the cache is kept fresh.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum snapshot age before a read forces a refresh.
    /// Only consulted when background refresh is off; `None` disables expiry.
    pub ttl: Option<Duration>,

    /// Whether a background task keeps the cache warm.
    pub background: bool,

    /// Period of the background task.
    pub refresh_period: Duration,
}

impl CacheConfig {
    /// Build from a TTL in seconds, as configured by `CACHE_SECONDS`.
    ///
    /// The TTL doubles as the background refresh period; a zero TTL disables
    /// expiry and falls back to the default period.
    pub fn from_seconds(seconds: u64, background: bool) -> Self {
        let defaults = Self::default();
        let ttl = (seconds > 0).then(|| Duration::from_secs(seconds));
        Self {
            ttl,
            background,
            refresh_period: ttl.unwrap_or(defaults.refresh_period),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(60)),
            background: true,
            refresh_period: Duration::from_secs(60),
        }
    }
}
