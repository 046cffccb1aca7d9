//! Schema and status bodies

use kneeforce_core::FeatureDescriptor;
use serde::Serialize;

/// `GET /api/v1/features`
#[derive(Debug, Clone, Serialize)]
pub struct FeaturesResponse {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: Vec<FeatureDescriptor>,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub core_version: &'static str,
    pub model: String,
    pub timestamp: i64,
}
