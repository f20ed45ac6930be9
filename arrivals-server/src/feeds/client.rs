//! MTA real-time feed HTTP client.

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::error::FeedError;

/// Base URL shared by all subway feed endpoints.
const FEED_BASE_URL: &str = "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2F";

/// Feed path suffix per line family.
const FEED_PATHS: [(&str, &str); 8] = [
    ("123456S", "gtfs"),
    ("L", "gtfs-l"),
    ("NQRW", "gtfs-nqrw"),
    ("BDFM", "gtfs-bdfm"),
    ("ACE", "gtfs-ace"),
    ("7", "gtfs-7"),
    ("JZ", "gtfs-jz"),
    ("G", "gtfs-g"),
];

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A single upstream feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoint {
    /// Short name of the line family, used in logs.
    pub name: String,
    /// Full URL of the feed.
    pub url: String,
}

impl FeedEndpoint {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The fixed list of subway feeds, one per line family.
pub fn default_endpoints() -> Vec<FeedEndpoint> {
    FEED_PATHS
        .iter()
        .map(|(name, path)| FeedEndpoint::new(*name, format!("{FEED_BASE_URL}{path}")))
        .collect()
}

/// Source of raw feed payloads.
///
/// This abstraction allows the refresh engine to be driven by canned
/// payloads in tests.
pub trait FeedFetcher: Send + Sync {
    /// The endpoints fetched each cycle.
    fn endpoints(&self) -> &[FeedEndpoint];

    /// Fetch the raw payload of one endpoint.
    fn fetch<'a>(&'a self, endpoint: &'a FeedEndpoint) -> BoxFuture<'a, Result<Vec<u8>, FeedError>>;
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// API key sent in the x-api-key header
    pub api_key: String,
    /// Endpoints fetched each cycle
    pub endpoints: Vec<FeedEndpoint>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl FeedClientConfig {
    /// Create a new config with the given API key and the default endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoints: default_endpoints(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Replace the endpoint list (for testing).
    pub fn with_endpoints(mut self, endpoints: Vec<FeedEndpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for the subway feeds.
///
/// Every request carries the credential and a bounded timeout, so one
/// unresponsive endpoint cannot stall a whole cycle.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    endpoints: Vec<FeedEndpoint>,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();

        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| FeedError::InvalidApiKey)?;
        headers.insert(HeaderName::from_static("x-api-key"), api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoints: config.endpoints,
        })
    }

    /// Fetch the raw bytes of one feed.
    pub async fn fetch_feed(&self, endpoint: &FeedEndpoint) -> Result<Vec<u8>, FeedError> {
        let response = self.http.get(&endpoint.url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FeedError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

impl FeedFetcher for FeedClient {
    fn endpoints(&self) -> &[FeedEndpoint] {
        &self.endpoints
    }

    fn fetch<'a>(&'a self, endpoint: &'a FeedEndpoint) -> BoxFuture<'a, Result<Vec<u8>, FeedError>> {
        self.fetch_feed(endpoint).boxed()
    }
}
