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
    models::{Model, User},
    state::AppState,
    storage::fetch_all,
    types::{CreateUser, UpdateUser},
};

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    to_list(&fetch_all::<User>(state.storage()).await?)
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateUser>,
) -> AppResult<(StatusCode, Json<Value>)> {
    store_new(&state, body.into_model()?).await
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<String>) -> AppResult<Json<Value>> {
    let user = find::<User>(state.storage(), &user_id).await?;
    Ok(Json(user.to_dict()?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let mut user = find::<User>(state.storage(), &user_id).await?;
    parse_object::<UpdateUser>(&body)?.apply(&mut user);
    store_update(&state, user).await
}

pub async fn delete_user(State(state): State<AppState>, Path(user_id): Path<String>) -> AppResult<Json<Value>> {
    remove::<User>(&state, &user_id).await
}
