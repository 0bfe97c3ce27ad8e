pub mod api;
pub mod auth;
pub mod db;
pub mod media;
pub mod models;
pub mod schema;
pub mod telemetry;

use std::sync::Arc;

/// Application state shared across all handlers
pub type AppState = Arc<db::DbPool>;
