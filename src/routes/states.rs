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
    models::{Model, State as StateModel},
    state::AppState,
    storage::fetch_all,
    types::{CreateState, UpdateState},
};

pub async fn list_states(State(state): State<AppState>) -> AppResult<Json<Vec<Value>>> {
    let states = fetch_all::<StateModel>(state.storage()).await?;
    to_list(&states)
}

pub async fn create_state(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateState>,
) -> AppResult<(StatusCode, Json<Value>)> {
    store_new(&state, body.into_model()?).await
}

pub async fn get_state(State(state): State<AppState>, Path(state_id): Path<String>) -> AppResult<Json<Value>> {
    let obj = find::<StateModel>(state.storage(), &state_id).await?;
    Ok(Json(obj.to_dict()?))
}

pub async fn update_state(
    State(state): State<AppState>,
    Path(state_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let mut obj = find::<StateModel>(state.storage(), &state_id).await?;
    parse_object::<UpdateState>(&body)?.apply(&mut obj);
    store_update(&state, obj).await
}

/// Deletes the state together with its cities and everything below them.
pub async fn delete_state(State(state): State<AppState>, Path(state_id): Path<String>) -> AppResult<Json<Value>> {
    remove::<StateModel>(&state, &state_id).await
}
