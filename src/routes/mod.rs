//! HTTP route handlers for the HBnB API.
//!
//! One module per resource. Collection endpoints list and create, item
//! endpoints read, update and delete. All resource routes live under
//! `/api/v1`; the operational probes in [`health`] are mounted at the root.

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::{rate_limit::rate_limit_middleware, security_headers::security_headers_middleware},
    models::Model,
    state::AppState,
    storage::{self, Storage},
};

pub mod amenities;
pub mod cities;
pub mod health;
pub mod index;
pub mod places;
pub mod places_amenities;
pub mod reviews;
pub mod states;
pub mod users;

/// Resource routes, relative to `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats))
        .route("/states", get(states::list_states).post(states::create_state))
        .route(
            "/states/{state_id}",
            get(states::get_state).put(states::update_state).delete(states::delete_state),
        )
        .route("/states/{state_id}/cities", get(cities::list_cities).post(cities::create_city))
        .route(
            "/cities/{city_id}",
            get(cities::get_city).put(cities::update_city).delete(cities::delete_city),
        )
        .route("/amenities", get(amenities::list_amenities).post(amenities::create_amenity))
        .route(
            "/amenities/{amenity_id}",
            get(amenities::get_amenity).put(amenities::update_amenity).delete(amenities::delete_amenity),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{user_id}", get(users::get_user).put(users::update_user).delete(users::delete_user))
        .route("/cities/{city_id}/places", get(places::list_places).post(places::create_place))
        .route(
            "/places/{place_id}",
            get(places::get_place).put(places::update_place).delete(places::delete_place),
        )
        .route("/places_search", post(places::places_search))
        .route("/places/{place_id}/amenities", get(places_amenities::list_place_amenities))
        .route(
            "/places/{place_id}/amenities/{amenity_id}",
            post(places_amenities::link_place_amenity).delete(places_amenities::unlink_place_amenity),
        )
        .route("/places/{place_id}/reviews", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/reviews/{review_id}",
            get(reviews::get_review).put(reviews::update_review).delete(reviews::delete_review),
        )
}

/// The complete application: API, probes, fallback and middleware stack.
pub fn app(state: AppState) -> Router {
    let cfg = state.config.clone();

    let cors = if cfg.cors.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins = cfg.cors.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .nest("/api/v1", api_router())
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
        .layer(DefaultBodyLimit::max(cfg.server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(from_fn_with_state(cfg, security_headers_middleware))
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

/// Loads an entity or fails with `404`.
pub(crate) async fn find<M: Model>(storage: &dyn Storage, id: &str) -> AppResult<M> {
    storage::fetch::<M>(storage, id).await?.ok_or_not_found(M::KIND.as_str())
}

pub(crate) fn to_list<M: Model>(objs: &[M]) -> AppResult<Json<Vec<Value>>> {
    let list = objs.iter().map(|o| o.to_dict()).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(list))
}

/// Deletes an entity (with cascade) and answers `{}`.
pub(crate) async fn remove<M: Model>(state: &AppState, id: &str) -> AppResult<Json<Value>> {
    let storage = state.storage();
    let obj = find::<M>(storage, id).await?;
    storage.delete(M::KIND, obj.id()).await?;
    storage.save().await?;
    state.metrics.inc_deleted();
    tracing::info!(kind = %M::KIND, id = %id, "Deleted");
    Ok(Json(json!({})))
}

/// Refreshes `updated_at`, stages and saves an updated entity.
pub(crate) async fn store_update<M: Model>(state: &AppState, mut obj: M) -> AppResult<Json<Value>> {
    obj.touch();
    let body = obj.to_dict()?;
    storage::persist(state.storage(), obj).await?;
    state.metrics.inc_updated();
    Ok(Json(body))
}

/// Stages and saves a new entity, answering `201` with its representation.
pub(crate) async fn store_new<M: Model>(
    state: &AppState,
    obj: M,
) -> AppResult<(axum::http::StatusCode, Json<Value>)> {
    let body = obj.to_dict()?;
    tracing::info!(kind = %M::KIND, id = %obj.id(), "Created");
    storage::persist(state.storage(), obj).await?;
    state.metrics.inc_created();
    Ok((axum::http::StatusCode::CREATED, Json(body)))
}
