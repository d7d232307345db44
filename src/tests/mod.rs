//! Crate-level tests for the HBnB API.
//!
//! ## Test Modules
//!
//! - **storage_tests**: the storage contract, run against both engines
//! - **api_tests**: REST endpoints through the full router
//! - **health_api_tests**: operational endpoints
//! - **error_tests**: error rendering and conversions
//! - **config_tests**: configuration loading and validation
//!
//! Individual modules can be run with:
//! ```bash
//! cargo test api_tests
//! ```

pub mod api_tests;
pub mod config_tests;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::{AppConfig, StorageKind};
use crate::state::AppState;
use crate::storage::{DbStorage, FileStorage, Storage};

/// A storage engine living in its own temp directory.
pub(crate) async fn temp_storage(kind: StorageKind) -> (TempDir, Arc<dyn Storage>) {
    let dir = TempDir::new().unwrap();
    let storage: Arc<dyn Storage> = match kind {
        StorageKind::File => Arc::new(FileStorage::open(dir.path().join("file.json")).await.unwrap()),
        StorageKind::Db => {
            let url = format!("sqlite://{}", dir.path().join("hbnb.db").display());
            Arc::new(DbStorage::connect(&url).await.unwrap())
        }
    };
    (dir, storage)
}

pub(crate) async fn test_app(kind: StorageKind) -> (TempDir, Router, AppState) {
    let (dir, storage) = temp_storage(kind).await;
    let mut config = AppConfig::default();
    config.storage.kind = kind;
    let state = AppState::new(storage, config);
    (dir, crate::routes::app(state.clone()), state)
}

/// Sends one request and returns the status with the JSON body (`Null` if empty).
pub(crate) async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, json)
}
