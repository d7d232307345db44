use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{find, remove, store_new, store_update, to_list};
use crate::{
    error::AppResult,
    extract::parse_object,
    models::{City, Model, State as StateModel},
    state::AppState,
    storage::fetch_all,
    types::{CreateCity, UpdateCity},
};

/// Cities of one state.
pub async fn list_cities(State(state): State<AppState>, Path(state_id): Path<String>) -> AppResult<Json<Vec<Value>>> {
    let storage = state.storage();
    let parent = find::<StateModel>(storage, &state_id).await?;
    let cities: Vec<City> =
        fetch_all::<City>(storage).await?.into_iter().filter(|c| c.state_id == parent.id).collect();
    to_list(&cities)
}

pub async fn create_city(
    State(state): State<AppState>,
    Path(state_id): Path<String>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Value>)> {
    let parent = find::<StateModel>(state.storage(), &state_id).await?;
    let city = parse_object::<CreateCity>(&body)?.into_model(&parent.id)?;
    store_new(&state, city).await
}

pub async fn get_city(State(state): State<AppState>, Path(city_id): Path<String>) -> AppResult<Json<Value>> {
    let city = find::<City>(state.storage(), &city_id).await?;
    Ok(Json(city.to_dict()?))
}

pub async fn update_city(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let mut city = find::<City>(state.storage(), &city_id).await?;
    parse_object::<UpdateCity>(&body)?.apply(&mut city);
    store_update(&state, city).await
}

pub async fn delete_city(State(state): State<AppState>, Path(city_id): Path<String>) -> AppResult<Json<Value>> {
    remove::<City>(&state, &city_id).await
}
