use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Liveness probe, no storage access
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: a storage round-trip bounded by a timeout
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let probe = state.storage().count(None);
    match tokio::time::timeout(std::time::Duration::from_secs(5), probe).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_snapshot())
}

// Prometheus text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let series: [(&str, &str, &str, u64); 7] = [
        ("entities_created", "counter", "Entities created", m.entities_created),
        ("entities_updated", "counter", "Entities updated", m.entities_updated),
        ("entities_deleted", "counter", "Entities deleted, cascades not counted", m.entities_deleted),
        ("searches", "counter", "Place searches served", m.searches),
        ("amenity_links", "counter", "Place/amenity links created", m.amenity_links),
        ("rate_limited", "counter", "Requests rejected by the rate limiter", m.rate_limited),
        ("uptime_seconds", "gauge", "Uptime seconds", m.uptime_seconds),
    ];
    let mut body = String::new();
    for (name, kind, help, value) in series {
        body.push_str(&format!(
            "# HELP hbnb_{name} {help}\n# TYPE hbnb_{name} {kind}\nhbnb_{name} {value}\n"
        ));
    }
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

pub async fn version(State(state): State<AppState>) -> impl IntoResponse {
    let storage = match state.config.storage.kind {
        crate::config::StorageKind::File => "file",
        crate::config::StorageKind::Db => "db",
    };
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "storage": storage,
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
