//! Web layer for the arrivals service.
//!
//! Serves the live snapshot as JSON. Every listing is wrapped in an
//! envelope carrying the data and how fresh it is.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
