use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::{find, remove, store_new, store_update, to_list};
use crate::{
    error::{validation::require, AppResult},
    extract::parse_object,
    models::{Amenity, City, Model, Place, User},
    search::{self, PlacesSearchRequest},
    state::AppState,
    storage::fetch_all,
    types::{CreatePlace, UpdatePlace},
};

/// Places of one city.
pub async fn list_places(State(state): State<AppState>, Path(city_id): Path<String>) -> AppResult<Json<Vec<Value>>> {
    let storage = state.storage();
    let city = find::<City>(storage, &city_id).await?;
    let places: Vec<Place> =
        fetch_all::<Place>(storage).await?.into_iter().filter(|p| p.city_id == city.id).collect();
    to_list(&places)
}

/// Checks run in order: city exists, `user_id` given, user exists, `name` given.
pub async fn create_place(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Value>)> {
    let storage = state.storage();
    let city = find::<City>(storage, &city_id).await?;
    let mut req = parse_object::<CreatePlace>(&body)?;
    let user_id = require(req.user_id.take(), "user_id")?;
    let user = find::<User>(storage, &user_id).await?;
    let place = req.into_model(&city.id, &user.id)?;
    store_new(&state, place).await
}

pub async fn get_place(State(state): State<AppState>, Path(place_id): Path<String>) -> AppResult<Json<Value>> {
    let place = find::<Place>(state.storage(), &place_id).await?;
    Ok(Json(place.to_dict()?))
}

pub async fn update_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let mut place = find::<Place>(state.storage(), &place_id).await?;
    parse_object::<UpdatePlace>(&body)?.apply(&mut place)?;
    store_update(&state, place).await
}

pub async fn delete_place(State(state): State<AppState>, Path(place_id): Path<String>) -> AppResult<Json<Value>> {
    remove::<Place>(&state, &place_id).await
}

/// `POST /places_search`: places filtered by location and amenities.
pub async fn places_search(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Vec<Value>>> {
    let req = parse_object::<PlacesSearchRequest>(&body)?;
    let storage = state.storage();

    let places = fetch_all::<Place>(storage).await?;
    let found = if req.is_unfiltered() {
        places
    } else {
        let cities = fetch_all::<City>(storage).await?;
        let amenities = fetch_all::<Amenity>(storage).await?;
        search::filter_places(&req, places, &cities, &amenities)
    };

    state.metrics.inc_searches();
    tracing::debug!(results = found.len(), "Place search");
    to_list(&found)
}
