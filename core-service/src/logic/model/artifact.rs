//! Model artifact format.
//!
//! A trained model is exported once (offline) to a versioned JSON document:
//! the estimator, its parameters, and the feature names binding tree
//! feature indices to [`Feature`](crate::logic::features::Feature) slots.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::tree::TreeArrays;
use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::error::ModelLoadError;

fn default_learning_rate() -> f64 {
    1.0
}

/// Top-level artifact document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Column order the model was trained on.
    pub feature_names: Vec<String>,
    pub model: EstimatorSpec,
}

/// Serialized estimator, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSpec {
    GradientBoosting {
        base_score: f64,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        /// Baseline reported by the exporter, cross-checked on load.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_value: Option<f64>,
        trees: Vec<TreeArrays>,
    },
    RandomForest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_value: Option<f64>,
        trees: Vec<TreeArrays>,
    },
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
}

impl EstimatorSpec {
    pub fn declared_expected_value(&self) -> Option<f64> {
        match self {
            Self::GradientBoosting { expected_value, .. }
            | Self::RandomForest { expected_value, .. } => *expected_value,
            Self::Linear { .. } => None,
        }
    }
}

impl ModelArtifact {
    /// Parse and check the format version.
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        let artifact: Self = serde_json::from_str(json)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelLoadError::UnsupportedVersion {
                found: artifact.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        Ok(artifact)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Lowercase hex SHA-256 of the artifact bytes.
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
