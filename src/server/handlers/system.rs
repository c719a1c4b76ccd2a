//! # 系统处理器

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::database;
use crate::server::AppState;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if database::ping(&state.db, Duration::from_secs(1)).await {
        (StatusCode::OK, Json(json!({ "status": "up" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "down" })),
        )
    }
}

/// `GET /`
pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
