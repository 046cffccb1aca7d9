//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use kneeforce_core::{api::render_table, assess, SafetyConfig};
use uuid::Uuid;

use crate::models::{PredictRequest, PredictResponse};
use crate::{AppResult, AppState};

/// Validate, predict and explain one feature set.
///
/// Inference runs inline: it is CPU-bound and bounded by the ensemble size.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();
    let with_explanation = state.config.explain_enabled && SafetyConfig::is_explain_enabled();

    let assessment = assess(&state.model, &request.features, with_explanation).map_err(|e| {
        tracing::warn!(%request_id, "Prediction rejected: {}", e);
        e
    })?;

    tracing::info!(
        %request_id,
        prediction = assessment.prediction.value,
        explained = assessment.explanation.is_some(),
        "Prediction served"
    );
    if let Some(report) = &assessment.explanation {
        tracing::debug!(%request_id, "\n{}", render_table(report));
    }

    Ok(Json(PredictResponse::new(request_id, state.model.name(), assessment)))
}
