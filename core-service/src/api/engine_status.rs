use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::config::SafetyConfig;
use crate::logic::features::{
    layout_hash, Feature, FeatureKind, Domain, FEATURE_COUNT, FEATURE_VERSION,
};
use crate::logic::model::Model;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,

    pub model: ModelStatus,
    pub explain_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub name: String,
    pub kind: String, // "gradient_boosting" | "random_forest" | "linear"
    pub source: Option<String>,
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
    pub n_trees: usize,
    pub n_nodes: usize,
    pub max_depth: usize,
    pub layout_hash: u32,
    pub feature_names: Vec<String>,
    pub expected_value: Option<f64>,
    pub explainable: bool,
}

/// Input slot description for form renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub position: usize,
    pub name: String,
    pub label: String,
    pub unit: Option<String>,
    pub kind: FeatureKind,
    pub domain: Domain,
    pub default: f64,
}

impl ModelStatus {
    pub fn from_model(model: &Model) -> Self {
        let layout = model.layout();
        Self {
            name: model.name().to_string(),
            kind: model.kind().as_str().to_string(),
            source: model.metadata().source.clone(),
            checksum: model.metadata().checksum.clone(),
            loaded_at: model.metadata().loaded_at,
            n_trees: model.n_trees(),
            n_nodes: model.n_nodes(),
            max_depth: model.max_depth(),
            layout_hash: layout.hash(),
            feature_names: layout.info().feature_names,
            expected_value: model.expected_value(),
            explainable: model.kind().is_tree_based(),
        }
    }
}

impl From<Feature> for FeatureDescriptor {
    fn from(feature: Feature) -> Self {
        Self {
            position: feature.index(),
            name: feature.name().to_string(),
            label: feature.label().to_string(),
            unit: feature.unit().map(str::to_string),
            kind: feature.kind(),
            domain: feature.domain(),
            default: feature.default_value(),
        }
    }
}

/// Canonical feature schema.
pub fn feature_schema() -> Vec<FeatureDescriptor> {
    Feature::ALL.into_iter().map(FeatureDescriptor::from).collect()
}

pub fn engine_status(model: &Model) -> EngineStatus {
    EngineStatus {
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        feature_count: FEATURE_COUNT,
        model: ModelStatus::from_model(model),
        explain_enabled: SafetyConfig::is_explain_enabled(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::testing::demo_model;

    #[test]
    fn test_model_status() {
        let status = ModelStatus::from_model(&demo_model());
        assert_eq!(status.kind, "gradient_boosting");
        assert_eq!(status.n_trees, 4);
        assert_eq!(status.max_depth, 2);
        assert!(status.explainable);
        assert_eq!(status.feature_names.len(), FEATURE_COUNT);
        assert_eq!(status.checksum.len(), 64);
    }

    #[test]
    fn test_feature_schema() {
        let schema = feature_schema();
        assert_eq!(schema.len(), FEATURE_COUNT);
        assert_eq!(schema[0].name, "knee_adduction_angle");
        assert_eq!(schema[7].kind, FeatureKind::Binary);
        assert_eq!(schema[6].default, 30.0);
        assert!(schema.iter().enumerate().all(|(i, d)| d.position == i));
    }

    #[test]
    fn test_engine_status_layout() {
        let status = engine_status(&demo_model());
        assert_eq!(status.layout_hash, status.model.layout_hash);
        assert_eq!(status.feature_version, FEATURE_VERSION);
    }
}
