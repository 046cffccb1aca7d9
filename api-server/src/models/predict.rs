//! Predict request/response bodies

use kneeforce_core::{Assessment, FeatureInput, Report};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /api/v1/predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    /// Feature name (or label) to raw value
    pub features: FeatureInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub model: String,
    pub layout_hash: u32,
    pub prediction: f64,
    pub prediction_display: String,
    pub explanation: Option<Report>,
    pub explanation_error: Option<String>,
}

impl PredictResponse {
    pub fn new(request_id: Uuid, model: &str, assessment: Assessment) -> Self {
        Self {
            request_id,
            model: model.to_string(),
            layout_hash: assessment.prediction.vector.layout_hash(),
            prediction: assessment.prediction.value,
            prediction_display: assessment.prediction.display(),
            explanation: assessment.explanation,
            explanation_error: assessment.explanation_error,
        }
    }
}
