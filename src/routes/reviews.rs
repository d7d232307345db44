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
    models::{Model, Place, Review, User},
    state::AppState,
    storage::fetch_all,
    types::{CreateReview, UpdateReview},
};

pub async fn list_reviews(State(state): State<AppState>, Path(place_id): Path<String>) -> AppResult<Json<Vec<Value>>> {
    let storage = state.storage();
    let place = find::<Place>(storage, &place_id).await?;
    let reviews: Vec<Review> =
        fetch_all::<Review>(storage).await?.into_iter().filter(|r| r.place_id == place.id).collect();
    to_list(&reviews)
}

/// Checks run in order: place exists, `user_id` given, user exists, `text` given.
pub async fn create_review(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Value>)> {
    let storage = state.storage();
    let place = find::<Place>(storage, &place_id).await?;
    let req = parse_object::<CreateReview>(&body)?;
    let user_id = require(req.user_id, "user_id")?;
    let user = find::<User>(storage, &user_id).await?;
    let text = require(req.text, "text")?;
    store_new(&state, Review::new(&place.id, &user.id, text)).await
}

pub async fn get_review(State(state): State<AppState>, Path(review_id): Path<String>) -> AppResult<Json<Value>> {
    let review = find::<Review>(state.storage(), &review_id).await?;
    Ok(Json(review.to_dict()?))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let mut review = find::<Review>(state.storage(), &review_id).await?;
    parse_object::<UpdateReview>(&body)?.apply(&mut review);
    store_update(&state, review).await
}

pub async fn delete_review(State(state): State<AppState>, Path(review_id): Path<String>) -> AppResult<Json<Value>> {
    remove::<Review>(&state, &review_id).await
}
