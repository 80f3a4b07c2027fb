use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use models::beer::{Beer, BeerId, NewBeer};

use crate::errors::JsonApiError;
use crate::routes::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_beers).post(create_beer))
        .route("/:name", get(find_by_name).delete(delete_by_id))
        .route("/:id/increment", patch(increment))
        .route("/:id/decrement", patch(decrement))
}

/// Increment/decrement payload.
#[derive(Debug, Deserialize)]
pub struct QuantityInput {
    pub quantity: i64,
}

pub async fn create_beer(
    State(state): State<ServerState>,
    Json(input): Json<NewBeer>,
) -> Result<(StatusCode, Json<Beer>), JsonApiError> {
    let beer = state.beers.register(input).await?;
    info!(id = %beer.id, name = %beer.name, "beer_created");
    Ok((StatusCode::CREATED, Json(beer)))
}

pub async fn list_beers(State(state): State<ServerState>) -> Result<Json<Vec<Beer>>, JsonApiError> {
    let all = state.beers.list_all().await?;
    Ok(Json(all))
}

pub async fn find_by_name(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Beer>, JsonApiError> {
    let beer = state.beers.find_by_name(&name).await?;
    Ok(Json(beer))
}

pub async fn delete_by_id(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, JsonApiError> {
    state.beers.delete_by_id(BeerId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn increment(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(input): Json<QuantityInput>,
) -> Result<Json<Beer>, JsonApiError> {
    let beer = state.beers.increment(BeerId(id), input.quantity).await?;
    Ok(Json(beer))
}

pub async fn decrement(
    State(state): State<ServerState>,
    Path(id): Path<u64>,
    Json(input): Json<QuantityInput>,
) -> Result<Json<Beer>, JsonApiError> {
    let beer = state.beers.decrement(BeerId(id), input.quantity).await?;
    Ok(Json(beer))
}
