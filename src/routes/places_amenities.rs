//! The place side of the place/amenity association.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{find, to_list};
use crate::{
    error::{AppError, AppResult},
    models::{Amenity, Model, Place},
    state::AppState,
    storage::{self, fetch_all},
};

pub async fn list_place_amenities(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> AppResult<Json<Vec<Value>>> {
    let storage = state.storage();
    let place = find::<Place>(storage, &place_id).await?;
    // keep link order
    let mut all = fetch_all::<Amenity>(storage).await?;
    let mut linked = Vec::with_capacity(place.amenity_ids.len());
    for id in &place.amenity_ids {
        if let Some(pos) = all.iter().position(|a| &a.id == id) {
            linked.push(all.swap_remove(pos));
        }
    }
    to_list(&linked)
}

/// Links an amenity. `201` for a new link, `200` if it already existed.
pub async fn link_place_amenity(
    State(state): State<AppState>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let storage = state.storage();
    let mut place = find::<Place>(storage, &place_id).await?;
    let amenity = find::<Amenity>(storage, &amenity_id).await?;

    if !place.link_amenity(&amenity.id) {
        return Ok((StatusCode::OK, Json(amenity.to_dict()?)));
    }
    storage::persist(storage, place).await?;
    state.metrics.inc_amenity_links();
    tracing::info!(place = %place_id, amenity = %amenity_id, "Amenity linked");
    Ok((StatusCode::CREATED, Json(amenity.to_dict()?)))
}

/// Unlinks an amenity. `404` when the place, the amenity or the link is missing.
pub async fn unlink_place_amenity(
    State(state): State<AppState>,
    Path((place_id, amenity_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let storage = state.storage();
    let mut place = find::<Place>(storage, &place_id).await?;
    let amenity = find::<Amenity>(storage, &amenity_id).await?;

    if !place.unlink_amenity(&amenity.id) {
        return Err(AppError::NotFound("Amenity not linked to place".to_string()));
    }
    storage::persist(storage, place).await?;
    tracing::info!(place = %place_id, amenity = %amenity_id, "Amenity unlinked");
    Ok(Json(serde_json::json!({})))
}
