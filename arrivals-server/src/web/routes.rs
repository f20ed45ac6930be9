//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::domain::{RouteId, StationView};
use crate::query::QueryError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// The listing routes are served at the root and, if `web_root` is
/// non-empty, again under that prefix.
pub fn create_router(state: AppState, web_root: &str) -> Router {
    let mut router = listing_routes(Router::new(), "");
    if !web_root.is_empty() {
        router = listing_routes(router, web_root);
    }

    router
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Register the listing routes under `prefix`, including `{prefix}/`.
fn listing_routes(router: Router<AppState>, prefix: &str) -> Router<AppState> {
    router
        .route(&format!("{prefix}/"), get(all_stations))
        .route(&format!("{prefix}/by-route/:route"), get(stations_by_route))
        .route(&format!("{prefix}/routes"), get(routes))
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Every station with its arrivals.
async fn all_stations(State(state): State<AppState>) -> Json<Envelope<Vec<StationView>>> {
    Json(Envelope::stations(state.query.get_all().await))
}

/// Stations served by one route.
async fn stations_by_route(
    State(state): State<AppState>,
    Path(route): Path<String>,
) -> Result<Json<Envelope<Vec<StationView>>>, AppError> {
    let stations = state.query.get_by_route(&route).await?;
    Ok(Json(Envelope::stations(stations)))
}

/// Routes in the current snapshot.
async fn routes(State(state): State<AppState>) -> Json<Envelope<Vec<RouteId>>> {
    let data = state.query.get_routes().await;
    let updated = Some(state.query.last_refreshed().await);
    Json(Envelope { data, updated })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::RouteNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            QueryError::InvalidRoute(_) => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        tracing::debug!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
