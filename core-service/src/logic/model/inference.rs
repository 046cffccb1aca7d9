//! Inference Engine - Tree Ensemble Model
//!
//! Loads the model artifact once and exposes a pure prediction function.
//! A loaded [`Model`] is immutable; share it by reference or `Arc`.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::{checksum, EstimatorSpec, ModelArtifact};
use super::ensemble::{Aggregation, LinearModel, Regressor, TreeEnsemble};
use super::tree::RegressionTree;
use crate::error::{ModelLoadError, ShapeMismatchError};
use crate::logic::features::{FeatureVector, Layout, FEATURE_COUNT};
use crate::tolerances;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Estimator family of a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    GradientBoosting,
    RandomForest,
    Linear,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GradientBoosting => "gradient_boosting",
            Self::RandomForest => "random_forest",
            Self::Linear => "linear",
        }
    }

    /// Whether the attribution engine can walk this model.
    pub fn is_tree_based(self) -> bool {
        !matches!(self, Self::Linear)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The estimator behind a model.
#[derive(Debug, Clone, PartialEq)]
pub enum Estimator {
    Trees(TreeEnsemble),
    Linear(LinearModel),
}

impl Estimator {
    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            Self::Trees(ensemble) => ensemble,
            Self::Linear(linear) => linear,
        }
    }
}

/// Where a model came from and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub source: Option<String>,
    /// SHA-256 of the artifact bytes
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
    pub declared_expected_value: Option<f64>,
}

/// A loaded, read-only regression model bound to a feature layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    layout: Layout,
    kind: ModelKind,
    estimator: Estimator,
    metadata: ModelMetadata,
}

/// Prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub value: f64,
    pub vector: FeatureVector,
}

impl Prediction {
    /// Value as shown to users, two decimals.
    pub fn display(&self) -> String {
        format!("{:.*}", crate::constants::DISPLAY_DECIMALS, self.value)
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl Model {
    /// Load an artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelLoadError> {
        Self::load_verified(path, None)
    }

    /// Load an artifact from disk, rejecting it if its SHA-256 differs from
    /// `expected_checksum`.
    pub fn load_verified(
        path: impl AsRef<Path>,
        expected_checksum: Option<&str>,
    ) -> Result<Self, ModelLoadError> {
        let path = path.as_ref();
        log::info!("Loading model artifact from: {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ModelLoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ModelLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let found = checksum(&bytes);
        if let Some(expected) = expected_checksum {
            if !expected.eq_ignore_ascii_case(&found) {
                return Err(ModelLoadError::ChecksumMismatch {
                    expected: expected.to_string(),
                    found,
                });
            }
        }

        let json = std::str::from_utf8(&bytes)
            .map_err(|e| ModelLoadError::Invalid(format!("artifact is not UTF-8: {e}")))?;
        let model = Self::from_artifact(
            ModelArtifact::from_json(json)?,
            found,
            Some(path.display().to_string()),
        )?;

        log::info!(
            "Model loaded: {} ({}, {} trees, {} nodes, max depth {}, layout {:08x}, sha256 {})",
            model.metadata.name,
            model.kind,
            model.n_trees(),
            model.n_nodes(),
            model.max_depth(),
            model.layout.hash(),
            model.metadata.checksum,
        );
        Ok(model)
    }

    /// Build a model from an in-memory JSON artifact.
    pub fn from_json(json: &str) -> Result<Self, ModelLoadError> {
        Self::from_artifact(ModelArtifact::from_json(json)?, checksum(json.as_bytes()), None)
    }

    /// Validate an artifact and bind it to its layout.
    pub fn from_artifact(
        artifact: ModelArtifact,
        checksum: String,
        source: Option<String>,
    ) -> Result<Self, ModelLoadError> {
        let layout = Layout::from_names(&artifact.feature_names)?;
        let declared_expected_value = artifact.model.declared_expected_value();

        let (kind, estimator) = match artifact.model {
            EstimatorSpec::GradientBoosting {
                base_score,
                learning_rate,
                trees,
                ..
            } => (
                ModelKind::GradientBoosting,
                Estimator::Trees(build_ensemble(
                    &trees,
                    Aggregation::Sum {
                        base_score,
                        learning_rate,
                    },
                )?),
            ),
            EstimatorSpec::RandomForest { trees, .. } => (
                ModelKind::RandomForest,
                Estimator::Trees(build_ensemble(&trees, Aggregation::Mean)?),
            ),
            EstimatorSpec::Linear {
                intercept,
                coefficients,
            } => {
                let coefficients: [f64; FEATURE_COUNT] =
                    coefficients.as_slice().try_into().map_err(|_| {
                        ModelLoadError::Invalid(format!(
                            "linear model needs {FEATURE_COUNT} coefficients, got {}",
                            coefficients.len()
                        ))
                    })?;
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelLoadError::Invalid(
                        "linear model has non-finite parameters".into(),
                    ));
                }
                (
                    ModelKind::Linear,
                    Estimator::Linear(LinearModel {
                        intercept,
                        coefficients,
                    }),
                )
            }
        };

        let model = Self {
            layout,
            kind,
            estimator,
            metadata: ModelMetadata {
                name: artifact.name.unwrap_or_else(|| kind.to_string()),
                source,
                checksum,
                loaded_at: Utc::now(),
                declared_expected_value,
            },
        };
        model.check_declared_baseline();
        Ok(model)
    }

    fn check_declared_baseline(&self) {
        let (Some(declared), Some(computed)) =
            (self.metadata.declared_expected_value, self.expected_value())
        else {
            return;
        };
        if !tolerances::within_relative(
            declared,
            computed,
            tolerances::DECLARED_BASELINE_RELATIVE,
        ) {
            log::warn!(
                "Artifact declares expected value {declared}, covers give {computed}; using {computed}"
            );
        }
    }
}

fn build_ensemble(
    trees: &[super::tree::TreeArrays],
    aggregation: Aggregation,
) -> Result<TreeEnsemble, ModelLoadError> {
    let trees = trees
        .iter()
        .enumerate()
        .map(|(i, arrays)| {
            RegressionTree::from_arrays(arrays, FEATURE_COUNT)
                .map_err(|reason| ModelLoadError::InvalidTree { tree: i, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;
    TreeEnsemble::new(trees, aggregation).map_err(ModelLoadError::Invalid)
}

// ============================================================================
// INFERENCE
// ============================================================================

impl Model {
    /// Reject vectors whose layout is not the model's training layout.
    pub fn check_layout(&self, vector: &FeatureVector) -> Result<(), ShapeMismatchError> {
        if vector.layout() != &self.layout {
            log::warn!(
                "Rejecting vector with layout {:08x}; model expects {:08x}",
                vector.layout_hash(),
                self.layout.hash()
            );
            return Err(ShapeMismatchError {
                expected_hash: self.layout.hash(),
                actual_hash: vector.layout_hash(),
            });
        }
        Ok(())
    }

    /// Deterministic prediction for one vector.
    pub fn predict(&self, vector: &FeatureVector) -> Result<Prediction, ShapeMismatchError> {
        self.check_layout(vector)?;
        let value = self.estimator.as_regressor().predict_row(vector.as_array());
        Ok(Prediction {
            value,
            vector: *vector,
        })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn tree_ensemble(&self) -> Option<&TreeEnsemble> {
        match &self.estimator {
            Estimator::Trees(ensemble) => Some(ensemble),
            Estimator::Linear(_) => None,
        }
    }

    /// Baseline of the attribution: expected output under the tree covers.
    /// `None` for models without tree structure.
    pub fn expected_value(&self) -> Option<f64> {
        self.tree_ensemble().map(TreeEnsemble::expected_value)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn n_trees(&self) -> usize {
        self.tree_ensemble().map_or(0, TreeEnsemble::n_trees)
    }

    pub fn n_nodes(&self) -> usize {
        self.tree_ensemble().map_or(0, TreeEnsemble::n_nodes)
    }

    pub fn max_depth(&self) -> usize {
        self.tree_ensemble().map_or(0, TreeEnsemble::max_depth)
    }
}

/// Free-function form of [`Model::predict`].
pub fn predict(model: &Model, vector: &FeatureVector) -> Result<Prediction, ShapeMismatchError> {
    model.predict(vector)
}

// ============================================================================
// TESTS
// ============================================================================
