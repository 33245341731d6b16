//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use loan_core::constants::VERSION;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model_loaded: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.classifier.is_ready();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "not_ready" },
        version: VERSION,
        model_loaded,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
