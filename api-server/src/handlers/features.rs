//! Feature schema handler

use axum::Json;
use kneeforce_core::{feature_schema, logic::features::layout_hash, FEATURE_VERSION};

use crate::models::FeaturesResponse;

/// Canonical input slots, for form renderers
pub async fn schema() -> Json<FeaturesResponse> {
    Json(FeaturesResponse {
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        features: feature_schema(),
    })
}
