use crate::components::events_feed::{Event, EventsFeed};
use crate::components::rotation::{DisplayMode, DisplayView, RotationHandle, SlideFormatter};
use crate::error::Error;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    /// Upstream pipeline behind the read endpoint
    pub feed: EventsFeed,
    /// Display driven by the refresh scheduler
    pub rotation: RotationHandle,
    pub formatter: Arc<SlideFormatter>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error returned from a handler as a JSON `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("Request failed with {}: {}", status, self.0);

        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(events_handler))
        .route("/api/display", get(display_handler))
        .route("/api/display/mode", post(display_mode_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Fetch straight from upstream; the cache is not consulted
pub async fn events_handler(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.feed.fetch_upcoming(Utc::now()).await?;
    Ok(Json(events))
}

pub async fn display_handler(State(state): State<AppState>) -> Result<Json<DisplayView>, ApiError> {
    let snapshot = state.rotation.snapshot().await?;
    Ok(Json(state.formatter.view(&snapshot)))
}

pub async fn display_mode_handler(
    State(state): State<AppState>,
    Json(mode): Json<DisplayMode>,
) -> Result<Json<DisplayView>, ApiError> {
    let snapshot = state.rotation.set_mode(mode).await?;
    Ok(Json(state.formatter.view(&snapshot)))
}

pub async fn health_handler() -> &'static str {
    "OK"
}
