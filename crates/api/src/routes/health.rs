//! Health check endpoint.

use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": "booking-api",
        "version": env!("CARGO_PKG_VERSION"),
        "time": Utc::now().timestamp(),
    }))
}
