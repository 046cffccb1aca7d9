//! Health check handler

use axum::{extract::State, Json};
use kneeforce_core::constants;

use crate::models::HealthResponse;
use crate::AppState;

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        core_version: constants::APP_VERSION,
        model: state.model.name().to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
