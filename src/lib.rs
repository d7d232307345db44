//! # HBnB Library
//!
//! Core of HBnB, a vacation-rental catalog: states and their cities,
//! amenities, users, places and reviews, exposed through a JSON REST API.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server and routing
//! - **SQLx**: SQLite access for the database storage engine
//! - **Tokio**: async runtime
//! - **Serde**: JSON for the API and for the file storage engine
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration (defaults, `hbnb.toml`, environment)
//! - [`db`]: SQLite connection setup and schema
//! - [`error`]: API error type and its HTTP rendering
//! - [`models`]: the persisted entities
//! - [`storage`]: the storage contract and its file and database engines
//! - [`search`]: the place search filter
//! - [`routes`]: HTTP handlers and the router
//! - [`middleware`]: rate limiting and security headers
//! - [`state`]: shared application state
//! - [`types`]: request bodies

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod search;
pub mod state;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;
