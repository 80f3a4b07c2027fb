use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use common::types::Health;
use service::beer::repository::JsonBeerRepository;
use service::beer::service::BeerService;

pub mod beers;

/// Shared handler state: the stock service over the file-backed repository.
#[derive(Clone)]
pub struct ServerState {
    pub beers: Arc<BeerService<JsonBeerRepository>>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health probe plus the beer stock API.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/beers", beers::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
