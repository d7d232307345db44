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
    extract::{parse_object, JsonBody},
    models::{Amenity, Model},
    state::AppState,
    storage::fetch_all,
    types::{CreateAmenity, UpdateAmenity},
};

pub async fn list_amenities(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    to_list(&fetch_all::<Amenity>(state.storage()).await?)
}

pub async fn create_amenity(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateAmenity>,
) -> AppResult<(StatusCode, Json<Value>)> {
    store_new(&state, body.into_model()?).await
}

pub async fn get_amenity(State(state): State<AppState>, Path(amenity_id): Path<String>) -> AppResult<Json<Value>> {
    let amenity = find::<Amenity>(state.storage(), &amenity_id).await?;
    Ok(Json(amenity.to_dict()?))
}

pub async fn update_amenity(
    State(state): State<AppState>,
    Path(amenity_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let mut amenity = find::<Amenity>(state.storage(), &amenity_id).await?;
    parse_object::<UpdateAmenity>(&body)?.apply(&mut amenity);
    store_update(&state, amenity).await
}

/// Deleting an amenity also removes it from every place it was linked to.
pub async fn delete_amenity(State(state): State<AppState>, Path(amenity_id): Path<String>) -> AppResult<Json<Value>> {
    remove::<Amenity>(&state, &amenity_id).await
}
