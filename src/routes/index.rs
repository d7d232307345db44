use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::{error::AppResult, models::Kind, state::AppState};

pub async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// Number of stored objects per class, keyed by the plural class name.
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let mut counts = Map::new();
    for kind in Kind::ALL {
        let n = state.storage().count(Some(kind)).await?;
        counts.insert(kind.plural().to_string(), json!(n));
    }
    Ok(Json(Value::Object(counts)))
}
