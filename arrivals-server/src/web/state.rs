//! Application state for the web layer.

use std::sync::Arc;

use crate::query::QueryService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Read side of the snapshot cache
    pub query: Arc<QueryService>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(query: QueryService) -> Self {
        Self {
            query: Arc::new(query),
        }
    }
}
