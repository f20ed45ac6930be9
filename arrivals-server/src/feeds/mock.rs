//! Mock feed fetcher for running without network access.
//!
//! Serves canned payloads (or canned failures) per endpoint as if they
//! were live responses.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;

use super::client::{FeedEndpoint, FeedFetcher};
use super::error::FeedError;

#[derive(Debug, Clone)]
enum MockResponse {
    Payload(Vec<u8>),
    Failure(String),
}

/// Feed fetcher that serves in-memory payloads.
///
/// Endpoints are registered in insertion order. Responses can be replaced
/// between cycles.
#[derive(Debug, Default)]
pub struct MockFeedFetcher {
    endpoints: Vec<FeedEndpoint>,
    responses: Mutex<HashMap<String, MockResponse>>,
    fetches: AtomicUsize,
}

impl MockFeedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint that returns `payload`.
    pub fn with_payload(mut self, name: &str, payload: Vec<u8>) -> Self {
        self.register(name, MockResponse::Payload(payload));
        self
    }

    /// Register an endpoint whose fetch fails.
    pub fn with_failure(mut self, name: &str, message: &str) -> Self {
        self.register(name, MockResponse::Failure(message.to_string()));
        self
    }

    fn register(&mut self, name: &str, response: MockResponse) {
        if !self.endpoints.iter().any(|e| e.name == name) {
            self.endpoints
                .push(FeedEndpoint::new(name, format!("mock://{name}")));
        }
        self.lock().insert(name.to_string(), response);
    }

    /// Replace the payload served for an existing endpoint.
    pub fn set_payload(&self, name: &str, payload: Vec<u8>) {
        self.lock()
            .insert(name.to_string(), MockResponse::Payload(payload));
    }

    /// Make an existing endpoint fail from now on.
    pub fn set_failure(&self, name: &str, message: &str) {
        self.lock()
            .insert(name.to_string(), MockResponse::Failure(message.to_string()));
    }

    /// Total number of fetches served.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MockResponse>> {
        // A panic while holding this lock cannot leave the map half-written.
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FeedFetcher for MockFeedFetcher {
    fn endpoints(&self) -> &[FeedEndpoint] {
        &self.endpoints
    }

    fn fetch<'a>(&'a self, endpoint: &'a FeedEndpoint) -> BoxFuture<'a, Result<Vec<u8>, FeedError>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let response = self.lock().get(&endpoint.name).cloned();

        async move {
            match response {
                Some(MockResponse::Payload(bytes)) => Ok(bytes),
                Some(MockResponse::Failure(message)) => Err(FeedError::Unavailable(message)),
                None => Err(FeedError::Unavailable(format!(
                    "no mock data for feed {}",
                    endpoint.name
                ))),
            }
        }
        .boxed()
    }
}
