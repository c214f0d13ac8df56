//! HTTP handlers for the GeoTrace event API
//! Provides the health, events, and map endpoints

use crate::config::Config;
use crate::dto::{EnrichedEvent, EventQuery, EventsResponse, HealthResponse};
use crate::enrich;
use crate::error::ApiError;
use crate::geoip::GeoProvider;
use crate::project;
use crate::search::SearchGateway;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<dyn SearchGateway>,
    pub geo: Arc<dyn GeoProvider>,
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(map_page))
        .route("/api/health", get(health))
        .route("/api/events", get(get_events))
        .with_state(state)
}

/// Health check endpoint; always 200
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        elastic: state.config.elastic.url.to_string(),
    })
}

/// Query recent events and enrich each hit with geo/ASN context.
/// Output order is exactly the backend order (timestamp descending).
async fn get_events(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<EventsResponse>, ApiError> {
    let start_time = Instant::now();
    let query = EventQuery::from_params(&params);

    let hits = state.gateway.execute(&query).await.map_err(|e| {
        error!("Search query failed: {}", e);
        e
    })?;

    let items: Vec<EnrichedEvent> = hits
        .iter()
        .map(|doc| {
            let enrichment = enrich::enrich(doc, state.geo.as_ref());
            project::project(doc, enrichment)
        })
        .collect();

    debug!(
        "Returned {} events in {}ms",
        items.len(),
        start_time.elapsed().as_millis()
    );

    Ok(Json(EventsResponse { items }))
}

/// Static map page plotting enriched events with Leaflet
async fn map_page() -> Html<&'static str> {
    Html(include_str!("../web/map.html"))
}
