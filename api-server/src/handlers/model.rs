//! Model status handler

use axum::{extract::State, Json};
use kneeforce_core::{engine_status, EngineStatus};

use crate::AppState;

pub async fn status(State(state): State<AppState>) -> Json<EngineStatus> {
    let mut status = engine_status(&state.model);
    status.explain_enabled &= state.config.explain_enabled;
    Json(status)
}
